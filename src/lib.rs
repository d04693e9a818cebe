// src/lib.rs
// Public library surface for the server, the batch CLI and integration tests.

pub mod aggregate;
pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod sink;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{run_batch, run_rows, BatchAggregate, BatchAggregator, BatchStats};
pub use crate::analyze::{AnalysisContext, AnalysisResult, AnnotatedPost, HazardCategory, PostAnalyzer};
pub use crate::api::router;
pub use crate::error::{AnalyzerError, Result};
pub use crate::ingest::types::{GeoPoint, Post, PostRow, PostSource, SourceChannel};
pub use crate::report::{AnalyticsReport, ExportDocument};
pub use crate::sentiment::{LexiconScorer, SentimentLabel, SentimentScorer};
