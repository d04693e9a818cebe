// src/sentiment.rs
//! Sentiment: the scorer seam, the built-in lexicon scorer, and the
//! three-way bucketing of compound scores.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Every label, in report order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a compound score in [-1, 1] to a label. NaN falls through to neutral.
pub fn bucket(score: f64) -> SentimentLabel {
    if score >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/* ----------------------------
Scorer seam
---------------------------- */

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ScorerError(String);

impl ScorerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Anything that maps text to a compound polarity score in [-1, 1].
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> Result<f64, ScorerError>;

    fn name(&self) -> &'static str {
        "custom"
    }
}

/* ----------------------------
Built-in valence-lexicon scorer
---------------------------- */

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../config/sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCR: f64 = 0.293;
const EXCLAMATION_INCR: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Word-valence scorer with negation, boosters and exclamation emphasis.
/// Never fails on string input.
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Valence for a single word (0.0 when absent).
    #[inline]
    fn word_valence(&self, w: &str) -> f64 {
        LEXICON.get(w).copied().unwrap_or(0.0)
    }

    /// Raw (unnormalized) valence sum plus token count.
    pub fn raw_score(&self, text: &str) -> (f64, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0f64;

        for (i, tok) in tokens.iter().enumerate() {
            let base = self.word_valence(tok);
            if base == 0.0 {
                continue;
            }
            let mut v = base;

            if i >= 1 {
                let boost = booster(tokens[i - 1].as_str());
                if boost != 0.0 {
                    v += boost * base.signum();
                }
            }

            // negator within the previous three tokens
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                v *= NEGATION_SCALAR;
            }

            sum += v;
        }

        if sum != 0.0 {
            let bangs = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
            sum += bangs * EXCLAMATION_INCR * sum.signum();
        }

        (sum, tokens.len())
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> Result<f64, ScorerError> {
        let (raw, _) = self.raw_score(text);
        Ok(normalize(raw))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn normalize(raw: f64) -> f64 {
    if raw == 0.0 {
        return 0.0;
    }
    (raw / (raw * raw + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Lowercased alphanumeric tokens; inner apostrophes survive so "isn't" stays whole.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "nothing"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

fn booster(tok: &str) -> f64 {
    match tok {
        "very" | "extremely" | "really" | "so" | "incredibly" | "highly" | "totally"
        | "absolutely" => BOOSTER_INCR,
        "slightly" | "barely" | "somewhat" | "hardly" | "kinda" => -BOOSTER_INCR,
        _ => 0.0,
    }
}
