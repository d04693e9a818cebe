// src/analyze/mod.rs
//! Per-post analysis: normalize, classify, score, bucket.

pub mod classify;
pub mod lexicon;
pub mod normalize;

use serde::{Deserialize, Serialize};

use crate::analyze::classify::HazardClassifier;
use crate::error::Result;
use crate::ingest::types::Post;
use crate::sentiment::{bucket, ScorerError, SentimentLabel, SentimentScorer};
use crate::telemetry::dev_log_post;

// Re-export convenient types.
pub use crate::analyze::classify::Classification;
pub use crate::analyze::lexicon::{HazardCategory, Lexicon, LexiconEntry};
pub use crate::analyze::normalize::{normalize, NormalizedText, StopWords};

/// Lexicon plus stop words. Built once at startup, then only borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisContext {
    lexicon: Lexicon,
    stop_words: StopWords,
}

impl AnalysisContext {
    pub fn new(lexicon: Lexicon, stop_words: StopWords) -> Self {
        Self {
            lexicon,
            stop_words,
        }
    }

    /// Built-in lexicon and the English stop-word list.
    pub fn builtin() -> Self {
        Self::new(Lexicon::builtin(), StopWords::english())
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::builtin()
    }
}

/// What the pipeline learned about one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Matched marker phrases, in match order.
    pub keywords: Vec<String>,
    pub hazard_type: Option<HazardCategory>,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

impl AnalysisResult {
    pub fn is_relevant(&self) -> bool {
        !self.keywords.is_empty()
    }
}

/// A post with its analysis attached. Serializes as the post fields plus `analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPost {
    #[serde(flatten)]
    pub post: Post,
    pub analysis: AnalysisResult,
}

/// Runs one post through the pipeline. Holds no per-post state.
#[derive(Clone, Copy)]
pub struct PostAnalyzer<'a> {
    ctx: &'a AnalysisContext,
    scorer: &'a dyn SentimentScorer,
}

impl<'a> PostAnalyzer<'a> {
    pub fn new(ctx: &'a AnalysisContext, scorer: &'a dyn SentimentScorer) -> Self {
        Self { ctx, scorer }
    }

    pub fn context(&self) -> &'a AnalysisContext {
        self.ctx
    }

    /// Analyze bare text. Scorer errors propagate unchanged; a non-finite
    /// score is a scorer error and finite scores are clamped to [-1, 1].
    pub fn analyze_text(&self, text: &str) -> Result<AnalysisResult> {
        let normalized = normalize(text, &self.ctx.stop_words);
        let Classification { matched, category } =
            HazardClassifier::new(&self.ctx.lexicon).classify(&normalized);

        let score = self.scorer.compound(&normalized.lowered)?;
        if !score.is_finite() {
            return Err(ScorerError::new(format!("non-finite compound score {score}")).into());
        }
        let score = score.clamp(-1.0, 1.0);

        Ok(AnalysisResult {
            keywords: matched,
            hazard_type: category,
            sentiment: bucket(score),
            sentiment_score: score,
        })
    }

    /// Validate, then analyze. Malformed posts are rejected before any scoring.
    pub fn analyze(&self, post: &Post) -> Result<AnalysisResult> {
        post.validate()?;
        let result = self.analyze_text(&post.text)?;
        dev_log_post(
            "analyzed",
            &post.text,
            &result.keywords,
            result.hazard_type.map(|c| c.as_str()),
            result.sentiment_score,
        );
        Ok(result)
    }

    pub fn annotate(&self, post: Post) -> Result<AnnotatedPost> {
        let analysis = self.analyze(&post)?;
        Ok(AnnotatedPost { post, analysis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::ingest::types::{GeoPoint, SourceChannel};
    use crate::sentiment::{LexiconScorer, ScorerError};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(f64);
    impl SentimentScorer for Fixed {
        fn compound(&self, _text: &str) -> std::result::Result<f64, ScorerError> {
            Ok(self.0)
        }
    }

    /// Records the text it was handed.
    #[derive(Default)]
    struct Spy {
        calls: AtomicUsize,
        last: parking_lot::Mutex<String>,
    }
    impl SentimentScorer for Spy {
        fn compound(&self, text: &str) -> std::result::Result<f64, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = text.to_string();
            Ok(0.0)
        }
    }

    struct Failing;
    impl SentimentScorer for Failing {
        fn compound(&self, _text: &str) -> std::result::Result<f64, ScorerError> {
            Err(ScorerError::new("model unavailable"))
        }
    }

    fn post(id: &str, text: &str) -> Post {
        Post::new(
            id,
            SourceChannel::Social,
            text,
            Utc.with_ymd_and_hms(2024, 12, 26, 6, 30, 0).unwrap(),
        )
    }

    #[test]
    fn composes_classification_and_sentiment() {
        let ctx = AnalysisContext::builtin();
        let scorer = Fixed(-0.6);
        let r = PostAnalyzer::new(&ctx, &scorer)
            .analyze(&post("p1", "Tsunami warning issued, high waves expected"))
            .unwrap();
        assert_eq!(r.keywords, vec!["tsunami".to_string()]);
        assert_eq!(r.hazard_type, Some(HazardCategory::Tsunami));
        assert_eq!(r.sentiment, SentimentLabel::Negative);
        assert_eq!(r.sentiment_score, -0.6);
        assert!(r.is_relevant());
    }

    #[test]
    fn scorer_sees_lowercased_text() {
        let ctx = AnalysisContext::builtin();
        let spy = Spy::default();
        PostAnalyzer::new(&ctx, &spy)
            .analyze(&post("p1", "STORM Surge Alert"))
            .unwrap();
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
        assert_eq!(spy.last.lock().as_str(), "storm surge alert");
    }

    #[test]
    fn irrelevant_posts_still_get_sentiment() {
        let ctx = AnalysisContext::builtin();
        let scorer = LexiconScorer::new();
        let r = PostAnalyzer::new(&ctx, &scorer)
            .analyze_text("everything is calm today")
            .unwrap();
        assert!(!r.is_relevant());
        assert_eq!(r.hazard_type, None);
        assert_eq!(r.sentiment, SentimentLabel::Positive);
    }

    #[test]
    fn malformed_post_is_rejected_before_scoring() {
        let ctx = AnalysisContext::builtin();
        let spy = Spy::default();
        let err = PostAnalyzer::new(&ctx, &spy)
            .analyze(&post("p1", "  "))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedPost { .. }));
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn scorer_failure_propagates() {
        let ctx = AnalysisContext::builtin();
        let err = PostAnalyzer::new(&ctx, &Failing)
            .analyze(&post("p1", "flooding"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Scorer(_)));
    }

    #[test]
    fn nan_score_is_a_scorer_error() {
        let ctx = AnalysisContext::builtin();
        let scorer = Fixed(f64::NAN);
        let err = PostAnalyzer::new(&ctx, &scorer)
            .analyze_text("flooding downtown")
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Scorer(_)));
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let ctx = AnalysisContext::builtin();
        let r = PostAnalyzer::new(&ctx, &Fixed(3.0))
            .analyze_text("flooding downtown")
            .unwrap();
        assert_eq!(r.sentiment_score, 1.0);
        assert_eq!(r.sentiment, SentimentLabel::Positive);

        let r = PostAnalyzer::new(&ctx, &Fixed(-7.5))
            .analyze_text("flooding downtown")
            .unwrap();
        assert_eq!(r.sentiment_score, -1.0);
        assert_eq!(r.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn annotated_post_flattens_on_the_wire() {
        let ctx = AnalysisContext::builtin();
        let scorer = Fixed(0.25);
        let p = post("p9", "Coastal erosion at the beach")
            .with_location(GeoPoint::named("Kochi", 9.93, 76.27));
        let annotated = PostAnalyzer::new(&ctx, &scorer).annotate(p).unwrap();

        let v = serde_json::to_value(&annotated).unwrap();
        assert_eq!(v["id"], "p9");
        assert_eq!(v["location"]["name"], "Kochi");
        assert_eq!(v["analysis"]["hazard_type"], "coastal_damage");
        assert_eq!(v["analysis"]["sentiment"], "positive");

        let back: AnnotatedPost = serde_json::from_value(v).unwrap();
        assert_eq!(back, annotated);
    }
}
