// src/report.rs
//! Reportable shapes handed to export and persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::BatchAggregate;
use crate::analyze::{AnnotatedPost, HazardCategory};
use crate::sentiment::SentimentLabel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCount {
    pub sentiment: SentimentLabel,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardCount {
    pub hazard_type: HazardCategory,
    pub count: u64,
}

/// Counters of one batch, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub keyword_counts: Vec<KeywordCount>,
    pub sentiment_counts: Vec<SentimentCount>,
    pub hazard_counts: Vec<HazardCount>,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsReport {
    /// Pure reshaping of the aggregate; nothing is filtered or recomputed.
    pub fn assemble(aggregate: &BatchAggregate) -> Self {
        Self {
            keyword_counts: aggregate
                .keyword_counts()
                .iter()
                .map(|(keyword, count)| KeywordCount {
                    keyword: keyword.clone(),
                    count: *count,
                })
                .collect(),
            sentiment_counts: aggregate
                .sentiment_counts()
                .iter()
                .map(|(sentiment, count)| SentimentCount {
                    sentiment: *sentiment,
                    count: *count,
                })
                .collect(),
            hazard_counts: aggregate
                .category_counts()
                .iter()
                .map(|(hazard_type, count)| HazardCount {
                    hazard_type: *hazard_type,
                    count: *count,
                })
                .collect(),
            timestamp: aggregate.aggregated_at(),
        }
    }

    pub fn hazard_count(&self, category: HazardCategory) -> u64 {
        self.hazard_counts
            .iter()
            .find(|h| h.hazard_type == category)
            .map(|h| h.count)
            .unwrap_or(0)
    }

    pub fn sentiment_count(&self, label: SentimentLabel) -> u64 {
        self.sentiment_counts
            .iter()
            .find(|s| s.sentiment == label)
            .map(|s| s.count)
            .unwrap_or(0)
    }
}

/// Self-describing document: annotated posts plus the analytics block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub posts: Vec<AnnotatedPost>,
    pub analytics: AnalyticsReport,
}

impl ExportDocument {
    pub fn from_aggregate(aggregate: BatchAggregate) -> Self {
        let analytics = AnalyticsReport::assemble(&aggregate);
        Self {
            posts: aggregate.into_posts(),
            analytics,
        }
    }
}
