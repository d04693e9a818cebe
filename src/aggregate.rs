// src/aggregate.rs
//! # Batch aggregation
//! Folds analyzed posts into keyword, sentiment and category counters.
//!
//! Two states: a mutable [`BatchAggregator`] while accumulating, and an
//! immutable [`BatchAggregate`] once `finalize` has consumed it. Irrelevant
//! posts (no matched phrase) never reach the counters or the output list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::analyze::{AnnotatedPost, HazardCategory, PostAnalyzer};
use crate::error::Result;
use crate::ingest::types::{Post, PostRow};
use crate::sentiment::SentimentLabel;

/// Bookkeeping for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Posts handed to the aggregator.
    pub seen: u64,
    /// Posts with at least one matched phrase.
    pub retained: u64,
    /// Well-formed posts without a match.
    pub irrelevant: u64,
    /// Posts rejected as malformed.
    pub rejected: u64,
}

impl BatchStats {
    fn absorb(&mut self, other: &BatchStats) {
        self.seen += other.seen;
        self.retained += other.retained;
        self.irrelevant += other.irrelevant;
        self.rejected += other.rejected;
    }
}

/// Accumulating state.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAggregator {
    posts: Vec<AnnotatedPost>,
    keyword_counts: Vec<(String, u64)>,
    sentiment_counts: BTreeMap<SentimentLabel, u64>,
    category_counts: BTreeMap<HazardCategory, u64>,
    stats: BatchStats,
}

impl Default for BatchAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchAggregator {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            keyword_counts: Vec::new(),
            sentiment_counts: SentimentLabel::ALL.iter().map(|l| (*l, 0)).collect(),
            category_counts: HazardCategory::ALL.iter().map(|c| (*c, 0)).collect(),
            stats: BatchStats::default(),
        }
    }

    /// Analyze and fold one post.
    ///
    /// Malformed posts are logged and skipped. Any other error (a scorer
    /// failure) is returned and the caller must abandon the batch.
    pub fn ingest(&mut self, analyzer: &PostAnalyzer<'_>, post: Post) -> Result<()> {
        self.ingest_row(analyzer, Ok(post))
    }

    /// Like [`ingest`](Self::ingest), for a row that may have failed to decode.
    pub fn ingest_row(&mut self, analyzer: &PostAnalyzer<'_>, row: PostRow) -> Result<()> {
        self.stats.seen += 1;
        match row.and_then(|post| analyzer.annotate(post)) {
            Ok(annotated) => {
                self.fold(annotated);
                Ok(())
            }
            Err(e) if e.is_per_post() => {
                warn!(error = %e, "dropping malformed post");
                self.stats.rejected += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Fold an already analyzed post. Returns whether it was retained.
    pub fn record(&mut self, annotated: AnnotatedPost) -> bool {
        self.stats.seen += 1;
        self.fold(annotated)
    }

    fn fold(&mut self, annotated: AnnotatedPost) -> bool {
        let analysis = &annotated.analysis;
        if !analysis.is_relevant() {
            self.stats.irrelevant += 1;
            return false;
        }

        for kw in &analysis.keywords {
            self.bump_keyword(kw, 1);
        }
        *self.sentiment_counts.entry(analysis.sentiment).or_insert(0) += 1;
        if let Some(cat) = analysis.hazard_type {
            *self.category_counts.entry(cat).or_insert(0) += 1;
        }

        self.stats.retained += 1;
        self.posts.push(annotated);
        true
    }

    fn bump_keyword(&mut self, keyword: &str, by: u64) {
        match self.keyword_counts.iter_mut().find(|(k, _)| k == keyword) {
            Some((_, n)) => *n += by,
            None => self.keyword_counts.push((keyword.to_string(), by)),
        }
    }

    /// Combine with the accumulator of the *following* slice of the batch.
    /// Counters add up; posts and first-seen keyword order stay in input order.
    pub fn merge(mut self, other: BatchAggregator) -> Self {
        for (kw, n) in &other.keyword_counts {
            self.bump_keyword(kw, *n);
        }
        for (label, n) in other.sentiment_counts {
            *self.sentiment_counts.entry(label).or_insert(0) += n;
        }
        for (cat, n) in other.category_counts {
            *self.category_counts.entry(cat).or_insert(0) += n;
        }
        self.stats.absorb(&other.stats);
        self.posts.extend(other.posts);
        self
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Seal the batch. Nothing can be added afterwards.
    pub fn finalize(self, aggregated_at: DateTime<Utc>) -> BatchAggregate {
        BatchAggregate {
            posts: self.posts,
            keyword_counts: self.keyword_counts,
            sentiment_counts: self.sentiment_counts,
            category_counts: self.category_counts,
            stats: self.stats,
            aggregated_at,
        }
    }
}

/// Finalized, read-only result of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAggregate {
    posts: Vec<AnnotatedPost>,
    keyword_counts: Vec<(String, u64)>,
    sentiment_counts: BTreeMap<SentimentLabel, u64>,
    category_counts: BTreeMap<HazardCategory, u64>,
    stats: BatchStats,
    aggregated_at: DateTime<Utc>,
}

impl BatchAggregate {
    /// Retained posts, in input order.
    pub fn posts(&self) -> &[AnnotatedPost] {
        &self.posts
    }

    /// Phrase counts in first-seen order.
    pub fn keyword_counts(&self) -> &[(String, u64)] {
        &self.keyword_counts
    }

    pub fn keyword_count(&self, keyword: &str) -> u64 {
        self.keyword_counts
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Always holds every label.
    pub fn sentiment_counts(&self) -> &BTreeMap<SentimentLabel, u64> {
        &self.sentiment_counts
    }

    pub fn sentiment_count(&self, label: SentimentLabel) -> u64 {
        self.sentiment_counts.get(&label).copied().unwrap_or(0)
    }

    /// Always holds every category.
    pub fn category_counts(&self) -> &BTreeMap<HazardCategory, u64> {
        &self.category_counts
    }

    pub fn category_count(&self, category: HazardCategory) -> u64 {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    pub fn aggregated_at(&self) -> DateTime<Utc> {
        self.aggregated_at
    }

    pub fn into_posts(self) -> Vec<AnnotatedPost> {
        self.posts
    }
}

/// Run a whole batch in order and finalize it at `now`.
///
/// Fail-fast: the first scorer error aborts the run and no partial aggregate
/// is returned.
pub fn run_batch<I>(analyzer: &PostAnalyzer<'_>, posts: I, now: DateTime<Utc>) -> Result<BatchAggregate>
where
    I: IntoIterator<Item = Post>,
{
    run_rows(analyzer, posts.into_iter().map(Ok), now)
}

/// [`run_batch`] over raw rows; undecodable rows count as rejected.
pub fn run_rows<I>(analyzer: &PostAnalyzer<'_>, rows: I, now: DateTime<Utc>) -> Result<BatchAggregate>
where
    I: IntoIterator<Item = PostRow>,
{
    let mut acc = BatchAggregator::new();
    for row in rows {
        acc.ingest_row(analyzer, row)?;
    }

    let stats = acc.stats();
    info!(
        seen = stats.seen,
        retained = stats.retained,
        irrelevant = stats.irrelevant,
        rejected = stats.rejected,
        "batch aggregated"
    );

    Ok(acc.finalize(now))
}
