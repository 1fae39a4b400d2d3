//! Deadline-bound execution of one aggregated search.

use std::time::Duration;

use hybrid_search::{AggregatedResponse, Aggregator};
use tokio_util::sync::CancellationToken;

use crate::config::HybridConfig;
use crate::error::Result;
use crate::request::{clamp_max_results, sanitize_query};

/// Run one search, cancelling every in-flight provider call at `deadline`.
///
/// Providers that finished before the deadline keep their results; the
/// rest are aborted and contribute nothing.
pub async fn search_with_deadline(
    aggregator: &Aggregator,
    query: &str,
    max_results: usize,
    sources: &[&str],
    deadline: Duration,
) -> AggregatedResponse {
    let cancel = CancellationToken::new();
    let timer = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(deadline).await;
            tracing::debug!(deadline_ms = deadline.as_millis() as u64, "search deadline reached");
            cancel.cancel();
        }
    });

    let response = aggregator
        .search_response(&cancel, query, max_results, sources)
        .await;

    timer.abort();
    response
}

/// Validate a raw request and run it under the configured deadline.
///
/// `requested` is the caller's result count; `None` uses the configured
/// default. Both pass through [`clamp_max_results`].
///
/// # Errors
///
/// Returns [`HybridError::InvalidQuery`](crate::error::HybridError::InvalidQuery)
/// if the query fails validation.
pub async fn handle_search(
    aggregator: &Aggregator,
    config: &HybridConfig,
    raw_query: &str,
    requested: Option<i64>,
    sources: &[&str],
) -> Result<AggregatedResponse> {
    let query = sanitize_query(raw_query)?;
    let fallback = i64::try_from(config.max_results).unwrap_or(i64::MAX);
    let max_results = clamp_max_results(requested.unwrap_or(fallback));

    Ok(search_with_deadline(
        aggregator,
        &query,
        max_results,
        sources,
        config.request_timeout(),
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hybrid_search::{SearchError, SearchProvider, SearchResult};
    use std::time::Instant;

    struct Delayed {
        name: &'static str,
        priority: u32,
        delay: Duration,
    }

    #[async_trait]
    impl SearchProvider for Delayed {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> u32 {
            self.priority
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn search(
            &self,
            cancel: &CancellationToken,
            query: &str,
            max_results: usize,
        ) -> std::result::Result<Vec<SearchResult>, SearchError> {
            tokio::select! {
                _ = cancel.cancelled() => Err(SearchError::Cancelled),
                _ = tokio::time::sleep(self.delay) => Ok((0..max_results)
                    .map(|i| {
                        SearchResult::new(
                            format!("{query} {i}"),
                            format!("https://{}.example/{i}", self.name),
                            "",
                            self.name,
                            0.5,
                        )
                    })
                    .collect()),
            }
        }
    }

    fn aggregator() -> Aggregator {
        let aggregator = Aggregator::new();
        aggregator.register_provider(Delayed {
            name: "fast",
            priority: 1,
            delay: Duration::from_millis(10),
        });
        aggregator.register_provider(Delayed {
            name: "slow",
            priority: 2,
            delay: Duration::from_secs(30),
        });
        aggregator
    }

    #[tokio::test]
    async fn deadline_cancels_slow_provider() {
        let aggregator = aggregator();
        let start = Instant::now();
        let response =
            search_with_deadline(&aggregator, "golang", 3, &[], Duration::from_millis(200)).await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(response.sources_used, ["fast"]);
        assert_eq!(response.count, 3);
    }

    #[tokio::test]
    async fn handle_search_sanitizes_and_clamps() {
        let aggregator = aggregator();
        let config = HybridConfig {
            request_timeout_secs: 1,
            ..HybridConfig::default()
        };

        let response = handle_search(&aggregator, &config, "  <b>golang</b> ", Some(500), &["fast"])
            .await
            .expect("valid request");
        assert_eq!(response.query, "golang");
        assert_eq!(response.count, 50);

        let response = handle_search(&aggregator, &config, "golang", None, &["fast"])
            .await
            .expect("valid request");
        assert_eq!(response.count, 10);
    }

    #[tokio::test]
    async fn handle_search_rejects_empty_query() {
        let aggregator = aggregator();
        let result = handle_search(&aggregator, &HybridConfig::default(), "   ", None, &[]).await;
        assert!(result.is_err());
    }
}
