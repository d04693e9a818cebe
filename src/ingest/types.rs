// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalyzerError;

/// Where a post came from. Platform names from social feeds fold into `Social`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceChannel {
    #[serde(alias = "twitter", alias = "facebook", alias = "instagram")]
    Social,
    News,
    #[default]
    #[serde(other)]
    Other,
}

impl SourceChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceChannel::Social => "social",
            SourceChannel::News => "news",
            SourceChannel::Other => "other",
        }
    }
}

impl fmt::Display for SourceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            name: None,
            lat,
            lng,
        }
    }

    pub fn named(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: Some(name.into()),
            lat,
            lng,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One raw post as yielded by a data source. Immutable once ingested.
///
/// `id` and `text` default to empty when absent on the wire; the analyzer
/// rejects such posts instead of failing the whole feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: SourceChannel,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Post {
    pub fn new(
        id: impl Into<String>,
        source: SourceChannel,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            text: text.into(),
            created_at,
            location: None,
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Required fields present and coordinates in range.
    pub fn validate(&self) -> std::result::Result<(), AnalyzerError> {
        if self.id.trim().is_empty() {
            return Err(AnalyzerError::malformed(&self.id, "missing id"));
        }
        if self.text.trim().is_empty() {
            return Err(AnalyzerError::malformed(&self.id, "missing text"));
        }
        if let Some(loc) = &self.location {
            if !loc.is_valid() {
                return Err(AnalyzerError::malformed(
                    &self.id,
                    format!("coordinates out of range ({}, {})", loc.lat, loc.lng),
                ));
            }
        }
        Ok(())
    }
}

/// One row as read off the wire: a post, or why it could not be read.
pub type PostRow = std::result::Result<Post, AnalyzerError>;

impl Post {
    /// Decode a single row. A null, wrong-typed or missing field rejects this
    /// row only, as `MalformedPost` carrying the row's id when it has one.
    pub fn from_value(value: serde_json::Value) -> PostRow {
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        serde_json::from_value(value).map_err(|e| AnalyzerError::malformed(&id, e.to_string()))
    }
}

/// Decode a JSON array of posts row by row. Only a body that is not an array
/// is an error.
pub fn rows_from_json(s: &str) -> serde_json::Result<Vec<PostRow>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(s)?;
    Ok(values.into_iter().map(Post::from_value).collect())
}

/// A finite, ordered supply of posts: a simulator, a recorded feed, a live API.
#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<PostRow>>;
    fn name(&self) -> &'static str;
}
