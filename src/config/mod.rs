// src/config/mod.rs
//! Runtime settings: optional TOML file, then environment overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::{AnalysisContext, Lexicon, StopWords};

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";
pub const DEFAULT_EXPORT_PATH: &str = crate::sink::json::DEFAULT_EXPORT_PATH;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_SIMULATION_COUNT: usize = 50;

pub const ENV_CONFIG_PATH: &str = "HAZARD_CONFIG_PATH";
pub const ENV_LEXICON_PATH: &str = crate::analyze::lexicon::ENV_LEXICON_PATH;
pub const ENV_EXPORT_PATH: &str = "HAZARD_EXPORT_PATH";
pub const ENV_DB_PATH: &str = "HAZARD_DB_PATH";
pub const ENV_BIND_ADDR: &str = "HAZARD_BIND_ADDR";

fn default_export_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_PATH)
}
fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}
fn default_simulation_count() -> usize {
    DEFAULT_SIMULATION_COUNT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_simulation_count")]
    pub count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_SIMULATION_COUNT,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Lexicon TOML; the built-in lexicon is used when unset.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    /// SQLite file; persistence is off when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lexicon_path: None,
            extra_stop_words: Vec::new(),
            export_path: default_export_path(),
            database_path: None,
            bind_addr: default_bind_addr(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(s).context("parsing settings TOML")?;
        if settings.bind_addr.trim().is_empty() {
            settings.bind_addr = default_bind_addr();
        }
        Ok(settings)
    }

    /// Load from an explicit file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings = Self::from_toml_str(&content)
            .with_context(|| format!("in {}", path.display()))?;
        settings.apply_env();
        Ok(settings)
    }

    /// Resolution order:
    /// 1) $HAZARD_CONFIG_PATH (must exist)
    /// 2) config/analyzer.toml (if present)
    /// 3) defaults
    ///
    /// Env overrides are applied in every case.
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                anyhow::bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        let mut settings = Self::default();
        settings.apply_env();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Some(p) = env_nonempty(ENV_LEXICON_PATH) {
            self.lexicon_path = Some(PathBuf::from(p));
        }
        if let Some(p) = env_nonempty(ENV_EXPORT_PATH) {
            self.export_path = PathBuf::from(p);
        }
        if let Some(p) = env_nonempty(ENV_DB_PATH) {
            self.database_path = Some(PathBuf::from(p));
        }
        if let Some(a) = env_nonempty(ENV_BIND_ADDR) {
            self.bind_addr = a;
        }
    }

    /// Build the immutable analysis context these settings describe.
    pub fn analysis_context(&self) -> Result<AnalysisContext> {
        let lexicon = match &self.lexicon_path {
            Some(p) => Lexicon::from_path(p)?,
            None => Lexicon::builtin(),
        };
        let stop_words = StopWords::english().with_extra(&self.extra_stop_words);
        Ok(AnalysisContext::new(lexicon, stop_words))
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn clear_env() {
        for k in [
            ENV_CONFIG_PATH,
            ENV_LEXICON_PATH,
            ENV_EXPORT_PATH,
            ENV_DB_PATH,
            ENV_BIND_ADDR,
        ] {
            env::remove_var(k);
        }
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let s = Settings::from_toml_str("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.simulation.count, 50);
        assert_eq!(s.export_path, PathBuf::from("nlp_output.json"));
    }

    #[test]
    fn toml_fields_are_read() {
        let s = Settings::from_toml_str(
            r#"
export_path = "out/batch.json"
database_path = "data/h.db"
extra_stop_words = ["breaking"]

[simulation]
count = 12
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(s.database_path, Some(PathBuf::from("data/h.db")));
        assert_eq!(s.simulation, SimulationSettings { count: 12, seed: Some(7) });
        let ctx = s.analysis_context().unwrap();
        assert!(ctx.stop_words().contains("breaking"));
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("analyzer.toml");
        fs::write(&p, "export_path = \"from_file.json\"\n").unwrap();

        env::set_var(ENV_EXPORT_PATH, "from_env.json");
        env::set_var(ENV_DB_PATH, "  ");
        let s = Settings::load_from(&p).unwrap();
        assert_eq!(s.export_path, PathBuf::from("from_env.json"));
        // blank env values are ignored
        assert_eq!(s.database_path, None);
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn load_uses_env_path_then_defaults() {
        clear_env();
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        // nothing on disk -> defaults
        let s = Settings::load().unwrap();
        assert_eq!(s, Settings::default());

        // explicit path that does not exist -> error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(Settings::load().is_err());

        // explicit path wins
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "bind_addr = \"127.0.0.1:9000\"\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, &p);
        assert_eq!(Settings::load().unwrap().bind_addr, "127.0.0.1:9000");

        clear_env();
        env::set_current_dir(&old).unwrap();
    }

    #[test]
    fn shipped_config_loads_the_shipped_lexicon() {
        let s = Settings::from_toml_str(include_str!("../../config/analyzer.toml")).unwrap();
        let rel = s.lexicon_path.clone().expect("lexicon_path is set");
        assert_eq!(rel, PathBuf::from(crate::analyze::lexicon::DEFAULT_LEXICON_PATH));

        let s = Settings {
            lexicon_path: Some(Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)),
            ..s
        };
        let ctx = s.analysis_context().unwrap();
        assert_eq!(ctx.lexicon(), &Lexicon::builtin());
    }

    #[test]
    fn bad_lexicon_path_is_an_error() {
        let s = Settings {
            lexicon_path: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Settings::default()
        };
        assert!(s.analysis_context().is_err());
    }
}
