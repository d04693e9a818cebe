// src/metrics.rs
use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::aggregate::BatchStats;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("hazard_posts_seen_total", "Posts handed to batch analysis.");
        describe_counter!(
            "hazard_posts_retained_total",
            "Posts with at least one matched hazard phrase."
        );
        describe_counter!(
            "hazard_posts_irrelevant_total",
            "Well-formed posts without a hazard match."
        );
        describe_counter!("hazard_posts_rejected_total", "Posts rejected as malformed.");
        describe_counter!("hazard_batches_total", "Completed batch runs.");
        describe_counter!(
            "hazard_batch_failures_total",
            "Batch runs aborted by a scorer failure."
        );
        describe_counter!("hazard_source_errors_total", "Post source fetch/parse errors.");
        describe_histogram!("hazard_batch_duration_ms", "Batch analysis time in milliseconds.");
        describe_histogram!("hazard_feed_parse_ms", "JSON feed parse time in milliseconds.");
        describe_gauge!(
            "hazard_batch_last_run_ts",
            "Unix ts when a batch last completed."
        );
    });
}

/// Telemetry for one completed batch.
pub fn record_batch(stats: &BatchStats, duration_ms: f64, finished_unix: i64) {
    counter!("hazard_posts_seen_total").increment(stats.seen);
    counter!("hazard_posts_retained_total").increment(stats.retained);
    counter!("hazard_posts_irrelevant_total").increment(stats.irrelevant);
    counter!("hazard_posts_rejected_total").increment(stats.rejected);
    counter!("hazard_batches_total").increment(1);
    histogram!("hazard_batch_duration_ms").record(duration_ms);
    gauge!("hazard_batch_last_run_ts").set(finished_unix as f64);
}

pub fn record_batch_failure() {
    counter!("hazard_batch_failures_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_counters_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let stats = BatchStats {
            seen: 10,
            retained: 7,
            irrelevant: 2,
            rejected: 1,
        };

        metrics::with_local_recorder(&recorder, || {
            record_batch(&stats, 12.5, 1_735_000_000);
            record_batch_failure();
        });

        let text = handle.render();
        for needle in [
            "hazard_posts_seen_total 10",
            "hazard_posts_retained_total 7",
            "hazard_posts_irrelevant_total 2",
            "hazard_posts_rejected_total 1",
            "hazard_batches_total 1",
            "hazard_batch_failures_total 1",
            "hazard_batch_last_run_ts",
            "hazard_batch_duration_ms",
        ] {
            assert!(text.contains(needle), "missing '{needle}'\n{text}");
        }
    }
}
