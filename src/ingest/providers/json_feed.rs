// src/ingest/providers/json_feed.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use std::path::{Path, PathBuf};

use crate::ingest::types::{rows_from_json, PostRow, PostSource};

/// Recorded feed: a JSON array of posts on disk.
pub struct JsonFeedSource {
    path: PathBuf,
}

impl JsonFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows are decoded one at a time; a bad row is handed on as rejected
    /// and the rest of the feed survives.
    pub fn parse_str(s: &str) -> Result<Vec<PostRow>> {
        let t0 = std::time::Instant::now();
        let rows = rows_from_json(s).context("parsing post feed json")?;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("hazard_feed_parse_ms").record(ms);
        Ok(rows)
    }
}

#[async_trait]
impl PostSource for JsonFeedSource {
    async fn fetch(&self) -> Result<Vec<PostRow>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading feed {}", self.path.display()))?;
        Self::parse_str(&body).with_context(|| format!("in {}", self.path.display()))
    }

    fn name(&self) -> &'static str {
        "json_feed"
    }
}
