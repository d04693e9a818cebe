// src/telemetry.rs
//! Tracing setup and anonymized dev diagnostics.

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "coastal_hazard_analyzer=info,warn";
pub const ENV_DEV_LOG: &str = "HAZARD_DEV_LOG";
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_LOG_JSON: &str = "HAZARD_LOG_JSON";

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var(ENV_LOG_JSON).ok().as_deref() == Some("1");
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

// Dev logging gate: HAZARD_DEV_LOG=1 AND dev env (debug build or APP_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var(ENV_APP_ENV)
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short, stable fingerprint of a text (first 6 bytes of SHA-256, hex).
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Per-post diagnostics. Never logs raw text, only its hash.
pub(crate) fn dev_log_post(
    event: &str,
    text: &str,
    matched: &[String],
    category: Option<&str>,
    score: f64,
) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    debug!(
        target: "coastal_hazard_analyzer::post",
        %id, event,
        matched = ?matched,
        category = category.unwrap_or("-"),
        score
    );
}
