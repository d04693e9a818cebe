// src/analyze/lexicon.rs
//! Hazard lexicon: the closed set of categories and their marker phrases.
//!
//! Declaration order is significant. The classifier scans categories and phrases
//! in exactly the order they appear here (or in the TOML file), and the first hit wins.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AnalyzerError, Result};

pub const DEFAULT_LEXICON_PATH: &str = "config/lexicon.toml";
pub const ENV_LEXICON_PATH: &str = "HAZARD_LEXICON_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardCategory {
    Flood,
    Tsunami,
    HighWaves,
    CoastalDamage,
}

impl HazardCategory {
    pub const ALL: [HazardCategory; 4] = [
        HazardCategory::Flood,
        HazardCategory::Tsunami,
        HazardCategory::HighWaves,
        HazardCategory::CoastalDamage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardCategory::Flood => "flood",
            HazardCategory::Tsunami => "tsunami",
            HazardCategory::HighWaves => "high_waves",
            HazardCategory::CoastalDamage => "coastal_damage",
        }
    }

    /// Tag as used in hashtags: `high_waves` -> `highwaves`.
    pub fn hashtag(&self) -> String {
        self.as_str().replace('_', "")
    }
}

impl fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardCategory {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        HazardCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalyzerError::Lexicon(format!("unknown hazard category `{s}`")))
    }
}

/// Built-in phrases; `config/lexicon.toml` mirrors this table.
const DEFAULT_ENTRIES: &[(HazardCategory, &[&str])] = &[
    (
        HazardCategory::Flood,
        &[
            "flood",
            "flooding",
            "inundation",
            "submerged",
            "water level",
            "rising water",
        ],
    ),
    (
        HazardCategory::Tsunami,
        &["tsunami", "tidal wave", "seismic sea wave", "harbor wave"],
    ),
    (
        HazardCategory::HighWaves,
        &[
            "high waves",
            "storm surge",
            "rough sea",
            "dangerous waves",
            "sea state",
        ],
    ),
    (
        HazardCategory::CoastalDamage,
        &[
            "coastal damage",
            "erosion",
            "coastal erosion",
            "shore damage",
            "beach damage",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconEntry {
    pub category: HazardCategory,
    pub phrases: Vec<String>,
}

/// Immutable, validated lexicon. Construct once and share by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

/* ----------------------------
File schema (TOML)
---------------------------- */

#[derive(Debug, Deserialize)]
struct LexiconFile {
    categories: Vec<CategoryCfg>,
}

#[derive(Debug, Deserialize)]
struct CategoryCfg {
    tag: HazardCategory,
    phrases: Vec<String>,
}

impl Lexicon {
    /// Validate and build. Phrases are trimmed and lowercased; empty phrases,
    /// empty categories and repeated tags are rejected.
    pub fn new(entries: Vec<LexiconEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(AnalyzerError::Lexicon("lexicon has no categories".into()));
        }

        let mut seen = HashSet::new();
        let mut clean = Vec::with_capacity(entries.len());
        for e in entries {
            if !seen.insert(e.category) {
                return Err(AnalyzerError::Lexicon(format!(
                    "category `{}` declared more than once",
                    e.category
                )));
            }
            if e.phrases.is_empty() {
                return Err(AnalyzerError::Lexicon(format!(
                    "category `{}` has no phrases",
                    e.category
                )));
            }
            let mut phrases = Vec::with_capacity(e.phrases.len());
            for p in e.phrases {
                let p = p.trim().to_lowercase();
                if p.is_empty() {
                    return Err(AnalyzerError::Lexicon(format!(
                        "category `{}` contains an empty phrase",
                        e.category
                    )));
                }
                phrases.push(p);
            }
            clean.push(LexiconEntry {
                category: e.category,
                phrases,
            });
        }

        Ok(Self { entries: clean })
    }

    /// The default coastal-hazard lexicon.
    pub fn builtin() -> Self {
        let entries = DEFAULT_ENTRIES
            .iter()
            .map(|(category, phrases)| LexiconEntry {
                category: *category,
                phrases: phrases.iter().map(|p| p.to_string()).collect(),
            })
            .collect();
        Self { entries }
    }

    /// Load from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: LexiconFile =
            toml::from_str(toml_str).map_err(|e| AnalyzerError::Lexicon(e.to_string()))?;
        let entries = file
            .categories
            .into_iter()
            .map(|c| LexiconEntry {
                category: c.tag,
                phrases: c.phrases,
            })
            .collect();
        Self::new(entries)
    }

    /// Load from a TOML file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        let lex = Self::from_toml_str(&content)
            .with_context(|| format!("parsing lexicon at {}", path.display()))?;
        Ok(lex)
    }

    /// Categories in scan order.
    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn phrases(&self, category: HazardCategory) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.phrases.as_slice())
    }

    pub fn phrase_count(&self) -> usize {
        self.entries.iter().map(|e| e.phrases.len()).sum()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}
