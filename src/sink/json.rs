// src/sink/json.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::report::ExportDocument;
use crate::sink::ResultSink;

pub const DEFAULT_EXPORT_PATH: &str = "nlp_output.json";

/// Write the document as pretty JSON, creating parent directories as needed.
pub fn export_to_json(doc: &ExportDocument, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let body = serde_json::to_string_pretty(doc)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}

/// Parse a document written by [`export_to_json`].
pub fn read_export(path: &Path) -> Result<ExportDocument> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn write(&self, doc: &ExportDocument) -> Result<()> {
        export_to_json(doc, &self.path).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
