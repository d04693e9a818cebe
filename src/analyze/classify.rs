// src/analyze/classify.rs
//! Single-label hazard classification over a normalized post.

use crate::analyze::lexicon::{HazardCategory, Lexicon};
use crate::analyze::normalize::NormalizedText;

/// Outcome of classification. `matched` is empty iff `category` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub matched: Vec<String>,
    pub category: Option<HazardCategory>,
}

impl Classification {
    pub fn is_relevant(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Scans the lexicon in declaration order; first phrase hit wins.
#[derive(Debug, Clone, Copy)]
pub struct HazardClassifier<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> HazardClassifier<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn classify(&self, text: &NormalizedText) -> Classification {
        for entry in self.lexicon.entries() {
            for phrase in &entry.phrases {
                if phrase_matches(phrase, text) {
                    return Classification {
                        matched: vec![phrase.clone()],
                        category: Some(entry.category),
                    };
                }
            }
        }
        Classification::default()
    }
}

/// Substring of the lowercased text, or any constituent word present as a token.
/// Multi-word phrases therefore also match on scattered words.
fn phrase_matches(phrase: &str, text: &NormalizedText) -> bool {
    text.lowered.contains(phrase) || phrase.split_whitespace().any(|w| text.has_token(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::lexicon::LexiconEntry;
    use crate::analyze::normalize::{normalize, StopWords};

    fn classify_with(lex: &Lexicon, text: &str) -> Classification {
        let n = normalize(text, &StopWords::english());
        HazardClassifier::new(lex).classify(&n)
    }

    fn classify(text: &str) -> Classification {
        classify_with(&Lexicon::builtin(), text)
    }

    #[test]
    fn first_declared_category_wins() {
        let c = classify("tsunami warning issued, high waves expected");
        assert_eq!(c.category, Some(HazardCategory::Tsunami));
        assert_eq!(c.matched, vec!["tsunami".to_string()]);
    }

    #[test]
    fn surface_order_does_not_matter() {
        let c = classify("high waves expected after the tsunami");
        assert_eq!(c.category, Some(HazardCategory::Tsunami));
    }

    #[test]
    fn calm_text_matches_nothing() {
        let c = classify("everything is calm today");
        assert!(!c.is_relevant());
        assert_eq!(c.category, None);
        assert!(c.matched.is_empty());
    }

    #[test]
    fn substring_match_inside_longer_word() {
        // "flood" is a substring of "floodwaters" even though no token equals it
        let c = classify("Floodwaters everywhere");
        assert_eq!(c.category, Some(HazardCategory::Flood));
        assert_eq!(c.matched, vec!["flood".to_string()]);
    }

    #[test]
    fn first_phrase_within_category_wins() {
        // both "flood" and "flooding" are present; "flood" is declared first
        let c = classify("Flooding reported downtown");
        assert_eq!(c.matched, vec!["flood".to_string()]);
    }

    #[test]
    fn multi_word_phrase_matches_on_scattered_words() {
        // "storm" alone is a constituent of "storm surge"
        let c = classify("a storm is coming to the harbour");
        assert_eq!(c.category, Some(HazardCategory::HighWaves));
        assert_eq!(c.matched, vec!["storm surge".to_string()]);
    }

    #[test]
    fn token_overlap_can_hit_an_earlier_category() {
        // "water" belongs to "water level" (flood) which is scanned before erosion
        let c = classify("beach erosion near the water");
        assert_eq!(c.category, Some(HazardCategory::Flood));
        assert_eq!(c.matched, vec!["water level".to_string()]);
    }

    #[test]
    fn stop_words_never_match_as_tokens() {
        let lex = Lexicon::new(vec![LexiconEntry {
            category: HazardCategory::Flood,
            phrases: vec!["over the top".into()],
        }])
        .unwrap();
        // "over" and "the" are stop words; only "top" can match by token
        assert!(!classify_with(&lex, "it is over").is_relevant());
        assert!(classify_with(&lex, "top story").is_relevant());
    }

    #[test]
    fn custom_order_changes_the_winner() {
        let lex = Lexicon::from_toml_str(
            r#"
[[categories]]
tag = "high_waves"
phrases = ["high waves"]
[[categories]]
tag = "tsunami"
phrases = ["tsunami"]
"#,
        )
        .unwrap();
        let c = classify_with(&lex, "tsunami warning issued, high waves expected");
        assert_eq!(c.category, Some(HazardCategory::HighWaves));
    }
}
