// src/analyze/normalize.rs
//! Text normalization: lowercase copy for substring matching plus a filtered
//! token stream for whole-word matching.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Standard English stop-word list.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
    "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
    "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

/// Social-feed noise on top of the language list.
const DOMAIN_NOISE: &[&str] = &["rt", "http", "https", "amp", "the", "a", "an", "in", "on", "at"];

/// Contraction suffixes split off a word before the alphabetic check.
const CLITICS: &[&str] = &["s", "t", "re", "ve", "ll", "d", "m"];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)[\w'’-]+").expect("word regex"));

/// Immutable stop-word set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// English list extended with the domain noise tokens.
    pub fn english() -> Self {
        let words = ENGLISH_STOP_WORDS
            .iter()
            .chain(DOMAIN_NOISE.iter())
            .map(|w| w.to_string())
            .collect();
        Self { words }
    }

    /// Add configured extras (trimmed, lowercased, blanks ignored).
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in extra {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() {
                self.words.insert(w);
            }
        }
        self
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Full text, lowercased. Used for substring matches and for scoring.
    pub lowered: String,
    /// Alphabetic, non-stop-word tokens in text order.
    pub tokens: Vec<String>,
}

impl NormalizedText {
    pub fn has_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }
}

/// Lowercase and tokenize. Tokens with digits, underscores, hyphens or other
/// non-letters are dropped; a trailing contraction (`'s`, `'re`, ...) is split
/// off first.
pub fn normalize(text: &str, stop_words: &StopWords) -> NormalizedText {
    let lowered = text.to_lowercase();

    let tokens = WORD_RE
        .find_iter(&lowered)
        .map(|m| strip_clitic(m.as_str()))
        .filter(|t| !t.is_empty() && t.chars().all(char::is_alphabetic))
        .filter(|t| !stop_words.contains(t))
        .map(str::to_string)
        .collect();

    NormalizedText { lowered, tokens }
}

fn strip_clitic(tok: &str) -> &str {
    match tok.find(['\'', '’']) {
        Some(idx) => {
            let head = &tok[..idx];
            let tail = tok[idx..].trim_start_matches(['\'', '’']);
            if CLITICS.contains(&tail) {
                head
            } else {
                tok
            }
        }
        None => tok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        normalize(text, &StopWords::english()).tokens
    }

    #[test]
    fn lowercases_and_keeps_original_spacing() {
        let n = normalize("Tsunami WARNING, stay safe!", &StopWords::english());
        assert_eq!(n.lowered, "tsunami warning, stay safe!");
        assert_eq!(n.tokens, vec!["tsunami", "warning", "stay", "safe"]);
    }

    #[test]
    fn drops_stop_words_and_noise() {
        assert_eq!(
            toks("RT the water is rising at the pier &amp; on the road"),
            vec!["water", "rising", "pier", "road"]
        );
    }

    #[test]
    fn drops_non_alphabetic_tokens() {
        assert_eq!(
            toks("Level 3 alert 🌊 covid-19 h2o sea_wall #flood"),
            vec!["level", "alert", "flood"]
        );
    }

    #[test]
    fn urls_break_into_scheme_noise() {
        assert_eq!(toks("see https://t.co/abc123 now"), vec!["see", "co"]);
    }

    #[test]
    fn contractions_lose_their_suffix() {
        assert_eq!(toks("Chennai's beach won't recover"), vec!["chennai", "beach", "recover"]);
    }

    #[test]
    fn extra_stop_words_apply() {
        let sw = StopWords::english().with_extra(["Chennai", " ", "alert"]);
        let n = normalize("Chennai alert: storm surge", &sw);
        assert_eq!(n.tokens, vec!["storm", "surge"]);
        assert!(sw.contains("chennai"));
        assert!(!sw.contains(""));
    }

    #[test]
    fn empty_text_is_empty() {
        let n = normalize("", &StopWords::english());
        assert!(n.lowered.is_empty());
        assert!(n.tokens.is_empty());
    }
}
