// src/bin/analyze_batch.rs
//! One-shot batch run: simulate (or read) posts, analyze, export JSON and
//! optionally persist to SQLite.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use coastal_hazard_analyzer::config::Settings;
use coastal_hazard_analyzer::ingest::providers::{JsonFeedSource, SimulatedSource};
use coastal_hazard_analyzer::ingest::types::PostSource;
use coastal_hazard_analyzer::sentiment::LexiconScorer;
use coastal_hazard_analyzer::sink::{self, JsonFileSink, ResultSink, SqliteStore};
use coastal_hazard_analyzer::telemetry::init_tracing;
use coastal_hazard_analyzer::{pipeline, PostAnalyzer};
use tracing::info;

#[derive(Parser)]
#[command(name = "analyze_batch", about = "Analyze a batch of coastal-hazard posts")]
struct Cli {
    /// Settings TOML (defaults to $HAZARD_CONFIG_PATH or config/analyzer.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON array of posts. Simulated posts are used when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Number of simulated posts.
    #[arg(short = 'n', long)]
    count: Option<usize>,
    /// Seed for reproducible simulation.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Export file (overrides settings).
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// SQLite database (overrides settings).
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(p) => Settings::load_from(p)?,
        None => Settings::load()?,
    };
    if let Some(o) = cli.output {
        settings.export_path = o;
    }
    if let Some(d) = cli.db {
        settings.database_path = Some(d);
    }

    let ctx = settings.analysis_context()?;
    let scorer = LexiconScorer::new();
    let analyzer = PostAnalyzer::new(&ctx, &scorer);

    let source: Box<dyn PostSource> = match cli.input {
        Some(path) => Box::new(JsonFeedSource::new(path)),
        None => {
            let count = cli.count.unwrap_or(settings.simulation.count);
            let mut sim = SimulatedSource::new(count, ctx.lexicon().clone());
            if let Some(seed) = cli.seed.or(settings.simulation.seed) {
                sim = sim.with_seed(seed);
            }
            Box::new(sim)
        }
    };

    let doc = pipeline::run(&[source], &analyzer, chrono::Utc::now())
        .await
        .context("batch analysis failed")?;

    let json = JsonFileSink::new(&settings.export_path);
    let store = match &settings.database_path {
        Some(p) => Some(SqliteStore::open(p)?),
        None => None,
    };
    let mut sinks: Vec<&dyn ResultSink> = vec![&json];
    if let Some(s) = &store {
        sinks.push(s);
    }
    let failures = sink::write_all(&sinks, &doc);

    info!(
        posts = doc.posts.len(),
        keywords = doc.analytics.keyword_counts.len(),
        export = %settings.export_path.display(),
        "batch complete"
    );
    if failures > 0 {
        anyhow::bail!("{failures} sink(s) failed");
    }
    Ok(())
}
