//! Coastal hazard analyzer: HTTP entrypoint.
//! Boots the Axum server with the configured lexicon, the built-in scorer
//! and the Prometheus `/metrics` route.

use std::sync::Arc;

use anyhow::Context;
use coastal_hazard_analyzer::api::{create_router, AppState};
use coastal_hazard_analyzer::config::Settings;
use coastal_hazard_analyzer::metrics::Metrics;
use coastal_hazard_analyzer::sentiment::LexiconScorer;
use coastal_hazard_analyzer::telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::load()?;
    let ctx = settings.analysis_context()?;
    info!(
        categories = ctx.lexicon().entries().len(),
        phrases = ctx.lexicon().phrase_count(),
        stop_words = ctx.stop_words().len(),
        "analysis context ready"
    );

    let metrics = Metrics::init()?;
    let state = AppState::new(ctx, Arc::new(LexiconScorer::new()));
    let app = create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
