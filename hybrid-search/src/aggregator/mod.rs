//! Search aggregator: provider registry, concurrent fan-out, dedup, ranking.
//!
//! The aggregator owns a priority-ordered registry of providers. A search
//! fans the query out to every eligible provider at once, waits for all of
//! them, drops failures, merges duplicate URLs and returns a ranked,
//! truncated list. Provider failures never fail the search.

pub mod dedup;
pub mod rank;
pub mod stats;

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::{AggregatedResponse, SearchResult};

use self::dedup::{deduplicate, Candidate};
use self::rank::rank;
use self::stats::{Outcome, ProviderStatus, StatsRegistry};

pub use self::stats::ProviderStats;

/// Fans queries out to registered providers and merges their answers.
///
/// Providers are registered during setup and then shared by every search;
/// the aggregator is `Send + Sync` and is usually held in an `Arc`.
#[derive(Default)]
pub struct Aggregator {
    providers: RwLock<Vec<Arc<dyn SearchProvider>>>,
    stats: StatsRegistry,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl Aggregator {
    /// Create an aggregator with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    pub fn register_provider(&self, provider: impl SearchProvider + 'static) {
        self.register_arc(Arc::new(provider));
    }

    /// Register a shared provider.
    ///
    /// A provider whose name is already registered replaces the earlier
    /// one. The registry is then re-sorted by ascending priority; providers
    /// with equal priority keep their registration order.
    pub fn register_arc(&self, provider: Arc<dyn SearchProvider>) {
        let mut providers = self.providers.write().unwrap_or_else(|e| e.into_inner());
        let name = provider.name().to_string();

        match providers.iter().position(|p| p.name() == name) {
            Some(index) => {
                tracing::warn!(provider = %name, "replacing already registered provider");
                providers[index] = provider;
            }
            None => providers.push(provider),
        }
        providers.sort_by_key(|p| p.priority());

        tracing::debug!(provider = %name, total = providers.len(), "provider registered");
    }

    /// Registered provider names in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.snapshot().iter().map(|p| p.name().to_string()).collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search every eligible provider and merge the results.
    ///
    /// `allowed` restricts the search to the named providers; an empty
    /// slice means all of them. Unknown names are ignored. The returned
    /// list has no two entries with the same non-empty URL, is sorted by
    /// relevance descending and holds at most `max_results` entries.
    ///
    /// Cancelling `cancel` aborts every in-flight provider call; results
    /// from providers that already finished are still returned.
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        max_results: usize,
        allowed: &[&str],
    ) -> Vec<SearchResult> {
        self.run(cancel, query, max_results, allowed).await.results
    }

    /// Like [`search`](Self::search) but wraps the results with the query
    /// and the names of the providers that answered.
    pub async fn search_response(
        &self,
        cancel: &CancellationToken,
        query: &str,
        max_results: usize,
        allowed: &[&str],
    ) -> AggregatedResponse {
        let merged = self.run(cancel, query, max_results, allowed).await;
        AggregatedResponse::new(query, merged.results, merged.sources_used)
    }

    /// Status of every registered provider, in priority order.
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.snapshot()
            .iter()
            .map(|p| {
                let name = p.name();
                ProviderStatus::from_stats(
                    name,
                    p.priority(),
                    p.is_available(),
                    &self.stats.get(name),
                    p.quota(),
                )
            })
            .collect()
    }

    fn snapshot(&self) -> Vec<Arc<dyn SearchProvider>> {
        self.providers.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn candidates(&self, allowed: &[&str]) -> Vec<Arc<dyn SearchProvider>> {
        let providers = self.snapshot();
        if allowed.is_empty() {
            return providers;
        }
        providers
            .into_iter()
            .filter(|p| allowed.iter().any(|name| *name == p.name()))
            .collect()
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        query: &str,
        max_results: usize,
        allowed: &[&str],
    ) -> Merged {
        let providers = self.candidates(allowed);
        if providers.is_empty() {
            tracing::debug!(?allowed, "no candidate providers");
            return Merged::default();
        }

        tracing::trace!(query, max_results, "aggregated search");

        // 1. Fan out to every candidate concurrently.
        let tasks = providers.iter().map(|provider| async move {
            let name = provider.name();
            if !provider.is_available() {
                tracing::debug!(provider = name, "provider unavailable, skipping");
                self.stats.record(name, Outcome::Skipped, Duration::ZERO);
                return None;
            }

            let started = Instant::now();
            let outcome = provider.search(cancel, query, max_results).await;
            let elapsed = started.elapsed();

            let recorded = if outcome.is_ok() {
                Outcome::Success
            } else {
                Outcome::Failure
            };
            self.stats.record(name, recorded, elapsed);
            Some(outcome)
        });

        let outcomes = futures::future::join_all(tasks).await;

        // 2. Collect successful results in registry order, dropping failures.
        let mut merged = Merged::default();
        let mut candidates: Vec<Candidate> = Vec::new();

        for (provider, outcome) in providers.iter().zip(outcomes) {
            let name = provider.name();
            match outcome {
                Some(Ok(results)) => {
                    tracing::debug!(provider = name, count = results.len(), "provider returned results");
                    merged.sources_used.push(name.to_string());
                    let priority = provider.priority();
                    for result in results {
                        let arrival = candidates.len();
                        candidates.push(Candidate {
                            result,
                            priority,
                            arrival,
                        });
                    }
                }
                Some(Err(SearchError::Cancelled)) => {
                    tracing::debug!(provider = name, "provider search cancelled");
                }
                Some(Err(err)) => {
                    tracing::warn!(provider = name, error = %err, "provider search failed");
                }
                None => {}
            }
        }

        // 3. Merge duplicate URLs, rank and truncate.
        let total = candidates.len();
        merged.results = rank(deduplicate(candidates), max_results);
        tracing::debug!(
            candidates = total,
            returned = merged.results.len(),
            sources = merged.sources_used.len(),
            "aggregated search complete"
        );

        merged
    }
}

#[derive(Debug, Default)]
struct Merged {
    results: Vec<SearchResult>,
    sources_used: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed {
        name: &'static str,
        priority: u32,
        available: bool,
        results: Vec<(&'static str, f64)>,
    }

    impl Fixed {
        fn new(name: &'static str, priority: u32, results: Vec<(&'static str, f64)>) -> Self {
            Self {
                name,
                priority,
                available: true,
                results,
            }
        }
    }

    #[async_trait]
    impl SearchProvider for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> u32 {
            self.priority
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn search(
            &self,
            _cancel: &CancellationToken,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchResult>, SearchError> {
            Ok(self
                .results
                .iter()
                .map(|(url, relevance)| SearchResult::new(*url, *url, "", self.name, *relevance))
                .collect())
        }
    }

    #[test]
    fn registry_is_sorted_by_priority() {
        let aggregator = Aggregator::new();
        aggregator.register_provider(Fixed::new("wikipedia", 3, vec![]));
        aggregator.register_provider(Fixed::new("brave", 1, vec![]));
        aggregator.register_provider(Fixed::new("duckduckgo", 2, vec![]));
        assert_eq!(aggregator.provider_names(), ["brave", "duckduckgo", "wikipedia"]);
        assert_eq!(aggregator.len(), 3);
    }

    #[test]
    fn equal_priorities_keep_registration_order() {
        let aggregator = Aggregator::new();
        aggregator.register_provider(Fixed::new("b", 2, vec![]));
        aggregator.register_provider(Fixed::new("a", 2, vec![]));
        aggregator.register_provider(Fixed::new("c", 1, vec![]));
        assert_eq!(aggregator.provider_names(), ["c", "b", "a"]);
    }

    #[test]
    fn duplicate_name_replaces_provider() {
        let aggregator = Aggregator::new();
        aggregator.register_provider(Fixed::new("brave", 1, vec![]));
        aggregator.register_provider(Fixed::new("brave", 5, vec![]));
        assert_eq!(aggregator.len(), 1);
        assert_eq!(aggregator.provider_status()[0].priority, 5);
    }

    #[test]
    fn new_aggregator_is_empty() {
        let aggregator = Aggregator::new();
        assert!(aggregator.is_empty());
        assert!(aggregator.provider_status().is_empty());
    }

    #[tokio::test]
    async fn empty_registry_returns_empty() {
        let aggregator = Aggregator::new();
        let cancel = CancellationToken::new();
        assert!(aggregator.search(&cancel, "golang", 5, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn unavailable_provider_is_skipped_and_counted() {
        let aggregator = Aggregator::new();
        let mut off = Fixed::new("brave", 1, vec![("https://a.com", 0.9)]);
        off.available = false;
        aggregator.register_provider(off);

        let cancel = CancellationToken::new();
        let response = aggregator.search_response(&cancel, "golang", 5, &[]).await;
        assert!(response.results.is_empty());
        assert!(response.sources_used.is_empty());

        let status = &aggregator.provider_status()[0];
        assert!(!status.available);
        assert_eq!(status.skipped_requests, 1);
        assert_eq!(status.total_requests, 0);
    }

    #[tokio::test]
    async fn sources_used_follow_priority_order() {
        let aggregator = Aggregator::new();
        aggregator.register_provider(Fixed::new("wikipedia", 3, vec![("https://w.org", 0.8)]));
        aggregator.register_provider(Fixed::new("brave", 1, vec![("https://b.com", 0.9)]));

        let cancel = CancellationToken::new();
        let response = aggregator.search_response(&cancel, "golang", 5, &[]).await;
        assert_eq!(response.sources_used, ["brave", "wikipedia"]);
        assert_eq!(response.count, 2);
        assert_eq!(response.query, "golang");
    }

    #[test]
    fn debug_lists_provider_names() {
        let aggregator = Aggregator::new();
        aggregator.register_provider(Fixed::new("brave", 1, vec![]));
        assert!(format!("{aggregator:?}").contains("brave"));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Aggregator>();
    }
}
