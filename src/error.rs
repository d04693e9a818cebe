//! Error types for the analysis pipeline and its sinks.

use thiserror::Error;

use crate::sentiment::ScorerError;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A post is missing a required field or carries an impossible value.
    /// Batches drop such posts and keep going.
    #[error("Malformed post {id:?}: {reason}")]
    MalformedPost { id: Option<String>, reason: String },

    /// The sentiment scorer rejected its input. Aborts the whole batch.
    #[error("Sentiment scorer failed: {0}")]
    Scorer(#[from] ScorerError),

    #[error("Lexicon error: {0}")]
    Lexicon(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        let id = if id.trim().is_empty() {
            None
        } else {
            Some(id.to_string())
        };
        Self::MalformedPost {
            id,
            reason: reason.into(),
        }
    }

    /// True for errors that only disqualify one post, not the batch.
    pub fn is_per_post(&self) -> bool {
        matches!(self, Self::MalformedPost { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
