// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{PostRow, PostSource};
use crate::metrics::ensure_metrics_described;
use metrics::counter;

/// Drain every source once, in order.
///
/// A failing source is logged and counted; the posts of the others are kept.
/// Rejected rows are passed through so the batch can count them.
pub async fn collect(sources: &[Box<dyn PostSource>]) -> Vec<PostRow> {
    ensure_metrics_described();

    let mut out = Vec::new();
    for s in sources {
        match s.fetch().await {
            Ok(mut v) => {
                tracing::debug!(source = s.name(), count = v.len(), "source fetched");
                out.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = s.name(), "source error");
                counter!("hazard_source_errors_total").increment(1);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use types::{Post, SourceChannel};

    struct Fixed(Vec<Post>);

    #[async_trait]
    impl PostSource for Fixed {
        async fn fetch(&self) -> anyhow::Result<Vec<PostRow>> {
            Ok(self.0.iter().cloned().map(Ok).collect())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct Down;

    #[async_trait]
    impl PostSource for Down {
        async fn fetch(&self) -> anyhow::Result<Vec<PostRow>> {
            Err(anyhow!("connection refused"))
        }
        fn name(&self) -> &'static str {
            "down"
        }
    }

    fn post(id: &str) -> Post {
        let ts = Utc.with_ymd_and_hms(2024, 12, 26, 6, 30, 0).unwrap();
        Post::new(id, SourceChannel::News, "Storm surge expected", ts)
    }

    #[tokio::test]
    async fn keeps_source_order() {
        let sources: Vec<Box<dyn PostSource>> = vec![
            Box::new(Fixed(vec![post("a"), post("b")])),
            Box::new(Fixed(vec![post("c")])),
        ];
        let ids: Vec<_> = collect(&sources)
            .await
            .into_iter()
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failing_source_is_skipped() {
        let sources: Vec<Box<dyn PostSource>> = vec![
            Box::new(Down),
            Box::new(Fixed(vec![post("a")])),
        ];
        let posts = collect(&sources).await;
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn no_sources_no_posts() {
        assert!(collect(&[]).await.is_empty());
    }
}
