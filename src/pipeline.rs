// src/pipeline.rs
//! End-to-end batch: collect → analyze → aggregate → report.

use chrono::{DateTime, Utc};
use std::time::Instant;

use crate::aggregate::run_rows;
use crate::analyze::PostAnalyzer;
use crate::error::Result;
use crate::ingest::{self, types::Post, types::PostRow, types::PostSource};
use crate::metrics::{ensure_metrics_described, record_batch, record_batch_failure};
use crate::report::ExportDocument;

/// Analyze an in-memory batch and shape it for export.
///
/// A scorer failure aborts the batch; the error is counted and returned.
pub fn analyze_posts(
    analyzer: &PostAnalyzer<'_>,
    posts: Vec<Post>,
    now: DateTime<Utc>,
) -> Result<ExportDocument> {
    analyze_rows(analyzer, posts.into_iter().map(Ok).collect(), now)
}

/// Same as [`analyze_posts`] for rows straight off the wire; rows that
/// failed to decode are counted as rejected.
pub fn analyze_rows(
    analyzer: &PostAnalyzer<'_>,
    rows: Vec<PostRow>,
    now: DateTime<Utc>,
) -> Result<ExportDocument> {
    ensure_metrics_described();
    let t0 = Instant::now();

    let aggregate = match run_rows(analyzer, rows, now) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "batch aborted");
            record_batch_failure();
            return Err(e);
        }
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    record_batch(&aggregate.stats(), ms, now.timestamp());
    Ok(ExportDocument::from_aggregate(aggregate))
}

/// Drain the sources, then analyze everything they yielded as one batch.
pub async fn run(
    sources: &[Box<dyn PostSource>],
    analyzer: &PostAnalyzer<'_>,
    now: DateTime<Utc>,
) -> Result<ExportDocument> {
    let rows = ingest::collect(sources).await;
    tracing::info!(posts = rows.len(), sources = sources.len(), "posts collected");
    analyze_rows(analyzer, rows, now)
}
