// src/sink/mod.rs
//! Output sinks for a finished batch: JSON export and SQLite persistence.
//!
//! Sinks sit outside the analysis core. They own their retries and rollback;
//! the core only guarantees a well-formed [`ExportDocument`].

pub mod json;
pub mod sqlite;

use tracing::{info, warn};

use crate::error::Result;
use crate::report::ExportDocument;

pub use crate::sink::json::{export_to_json, read_export, JsonFileSink};
pub use crate::sink::sqlite::SqliteStore;

pub trait ResultSink {
    fn write(&self, doc: &ExportDocument) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Hand the document to every sink. A failing sink is logged and does not
/// stop the others; the number of failures is returned.
pub fn write_all(sinks: &[&dyn ResultSink], doc: &ExportDocument) -> usize {
    let mut failures = 0usize;
    for s in sinks {
        match s.write(doc) {
            Ok(()) => info!(sink = s.name(), posts = doc.posts.len(), "batch written"),
            Err(e) => {
                warn!(sink = s.name(), error = %e, "sink failed");
                failures += 1;
            }
        }
    }
    failures
}
