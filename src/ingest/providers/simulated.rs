// src/ingest/providers/simulated.rs
//! Synthetic coastal-hazard posts for demos and load tests.
//!
//! Every post embeds one lexicon phrase, so a simulated batch is always
//! relevant. Which category it finally lands in is up to the classifier.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::analyze::Lexicon;
use crate::ingest::types::{GeoPoint, Post, PostRow, PostSource, SourceChannel};

const TEMPLATES: &[&str] = &[
    "Seeing {hazard} in {location} area. Stay safe everyone! #{tag} #emergency",
    "Alert: {hazard} reported near {location}. Authorities responding. #{tag}",
    "Just witnessed {hazard} at {location} beach. Scary situation! #{tag} #warning",
    "{hazard} situation worsening in {location}. Need immediate help! #{tag}",
    "Update: {hazard} conditions improving in {location} after emergency response. #{tag}",
    "Breaking: {hazard} warning issued for {location} coastal areas. Take precautions! #{tag}",
    "My neighborhood in {location} is affected by {hazard}. Roads blocked. #{tag}",
    "Government officials monitoring {hazard} situation in {location}. Stay tuned for updates. #{tag}",
    "Relief efforts underway for {hazard} victims in {location}. #{tag} #relief",
    "Volunteers needed to help with {hazard} aftermath in {location}. #{tag} #volunteer",
];

const LOCATIONS: &[(&str, f64, f64)] = &[
    ("Chennai", 13.0827, 80.2707),
    ("Mumbai", 19.0760, 72.8777),
    ("Kochi", 9.9312, 76.2673),
    ("Visakhapatnam", 17.6868, 83.2185),
    ("Puducherry", 11.9416, 79.8083),
];

/// Platform mix: three social networks and one news wire.
const CHANNELS: &[SourceChannel] = &[
    SourceChannel::Social,
    SourceChannel::Social,
    SourceChannel::Social,
    SourceChannel::News,
];

/// Max coordinate jitter in degrees.
const JITTER_DEG: f64 = 0.05;
/// Posts are spread over the day before the anchor.
const WINDOW_MINUTES: i64 = 24 * 60;

pub struct SimulatedSource {
    count: usize,
    seed: Option<u64>,
    anchor: DateTime<Utc>,
    lexicon: Lexicon,
}

impl SimulatedSource {
    pub fn new(count: usize, lexicon: Lexicon) -> Self {
        Self {
            count,
            seed: None,
            anchor: Utc::now(),
            lexicon,
        }
    }

    /// Same seed and anchor give the same posts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn generate(&self) -> Vec<Post> {
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let stamp = self.anchor.timestamp();
        (0..self.count)
            .filter_map(|i| self.one(&mut rng, stamp, i))
            .collect()
    }

    fn one(&self, rng: &mut StdRng, stamp: i64, index: usize) -> Option<Post> {
        let entry = self.lexicon.entries().choose(rng)?;
        let phrase = entry.phrases.choose(rng)?;
        let template = TEMPLATES.choose(rng)?;
        let (city, lat, lng) = *LOCATIONS.choose(rng)?;
        let source = *CHANNELS.choose(rng)?;

        let text = template
            .replace("{hazard}", &title_case(phrase))
            .replace("{location}", city)
            .replace("{tag}", &entry.category.hashtag());

        let location = GeoPoint::named(
            city,
            lat + rng.random_range(-JITTER_DEG..=JITTER_DEG),
            lng + rng.random_range(-JITTER_DEG..=JITTER_DEG),
        );
        let created_at = self.anchor - Duration::minutes(rng.random_range(0..WINDOW_MINUTES));
        let id = format!("sim_{stamp}_{index}_{}", rng.random_range(1000..10000));

        Some(Post::new(id, source, text, created_at).with_location(location))
    }
}

#[async_trait]
impl PostSource for SimulatedSource {
    async fn fetch(&self) -> Result<Vec<PostRow>> {
        let posts = self.generate();
        tracing::debug!(count = posts.len(), "simulated posts generated");
        Ok(posts.into_iter().map(Ok).collect())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 26, 9, 0, 0).unwrap()
    }

    fn source(count: usize, seed: u64) -> SimulatedSource {
        SimulatedSource::new(count, Lexicon::builtin())
            .with_seed(seed)
            .with_anchor(anchor())
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("high waves"), "High Waves");
        assert_eq!(title_case("tsunami"), "Tsunami");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn seeded_runs_repeat() {
        assert_eq!(source(20, 42).generate(), source(20, 42).generate());
        assert_ne!(source(20, 42).generate(), source(20, 43).generate());
    }

    #[test]
    fn posts_are_well_formed() {
        let posts = source(100, 7).generate();
        assert_eq!(posts.len(), 100);

        let ids: HashSet<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 100, "ids must be unique");

        for p in &posts {
            p.validate().unwrap();
            assert!(p.created_at <= anchor());
            assert!(p.created_at > anchor() - Duration::minutes(WINDOW_MINUTES));
            assert!(!p.text.contains('{'), "unfilled placeholder in {:?}", p.text);
            let loc = p.location.as_ref().unwrap();
            let (_, lat, lng) = LOCATIONS
                .iter()
                .find(|(n, _, _)| Some(*n) == loc.name.as_deref())
                .copied()
                .unwrap();
            assert!((loc.lat - lat).abs() <= JITTER_DEG + 1e-9);
            assert!((loc.lng - lng).abs() <= JITTER_DEG + 1e-9);
        }
    }

    #[test]
    fn every_post_mentions_a_lexicon_phrase() {
        let lex = Lexicon::builtin();
        for p in source(50, 3).generate() {
            let lowered = p.text.to_lowercase();
            let hit = lex
                .entries()
                .iter()
                .flat_map(|e| e.phrases.iter())
                .any(|ph| lowered.contains(ph.as_str()));
            assert!(hit, "no phrase in {:?}", p.text);
        }
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(source(0, 1).generate().is_empty());
    }

    #[tokio::test]
    async fn fetch_yields_generated_posts() {
        let src = source(5, 11);
        let posts: Vec<Post> = src
            .fetch()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(posts, src.generate());
        assert_eq!(src.name(), "simulated");
    }
}
