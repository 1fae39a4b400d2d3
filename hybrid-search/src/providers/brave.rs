//! Brave Search API provider: paid, quota-gated, highest quality.
//!
//! Uses the JSON web search endpoint with a subscription token. Each API
//! key comes with a small daily allowance, so the provider tracks its own
//! [`DailyQuota`] and reports itself unavailable once it is spent.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;
use crate::quota::{DailyQuota, QuotaSnapshot};
use crate::types::SearchResult;

/// Default API root; requests go to `{base_url}/web/search`.
pub const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1";

/// Relevance prior for Brave results.
pub const BRAVE_RELEVANCE: f64 = 0.9;

/// The API rejects `count` values above this.
const BRAVE_MAX_COUNT: usize = 20;

const NAME: &str = "brave";

/// Configuration for [`BraveProvider`].
#[derive(Debug, Clone)]
pub struct BraveConfig {
    /// Subscription token. Empty means the provider is unconfigured.
    pub api_key: String,
    /// Successful calls allowed per day.
    pub daily_quota: u32,
    /// API root, overridable for tests.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Registry ordering hint.
    pub priority: u32,
}

impl BraveConfig {
    /// Configuration with the given key and default everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Whether a usable API key is set. Whitespace-only keys do not count.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Override the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the daily allowance.
    pub fn with_daily_quota(mut self, daily_quota: u32) -> Self {
        self.daily_quota = daily_quota;
        self
    }
}

impl Default for BraveConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            daily_quota: 66,
            base_url: BRAVE_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            priority: 1,
        }
    }
}

/// Brave Search API provider.
pub struct BraveProvider {
    config: BraveConfig,
    quota: Mutex<DailyQuota>,
    client: reqwest::Client,
}

impl BraveProvider {
    /// Create a provider with a full quota resetting at the next local midnight.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn new(config: BraveConfig) -> Result<Self, SearchError> {
        let quota = DailyQuota::new(config.daily_quota, Local::now());
        Self::with_quota(config, quota)
    }

    /// Create a provider with explicit quota state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn with_quota(config: BraveConfig, quota: DailyQuota) -> Result<Self, SearchError> {
        let client = http::build_client(config.timeout, None)?;
        Ok(Self {
            config,
            quota: Mutex::new(quota),
            client,
        })
    }

    fn lock_quota(&self) -> std::sync::MutexGuard<'_, DailyQuota> {
        self.quota.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let count = max_results.min(BRAVE_MAX_COUNT).to_string();
        let request = self
            .client
            .get(format!("{}/web/search", self.config.base_url.trim_end_matches('/')))
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.config.api_key);

        let body = http::fetch_text(cancel, request, NAME).await?;
        tracing::trace!(bytes = body.len(), "Brave response received");

        parse_brave_json(&body, max_results)
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> u32 {
        self.config.priority
    }

    fn is_available(&self) -> bool {
        if !self.config.has_api_key() {
            return false;
        }
        self.lock_quota().is_available(Local::now())
    }

    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if query.trim().is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }
        if !self.config.has_api_key() {
            return Err(SearchError::Unavailable("brave: API key not configured".into()));
        }

        let permit = self
            .lock_quota()
            .try_reserve(Local::now())
            .ok_or_else(|| SearchError::Unavailable("brave: daily quota exhausted".into()))?;

        tracing::trace!(query, "Brave search");

        match self.fetch(cancel, query, max_results).await {
            Ok(results) => {
                tracing::debug!(count = results.len(), remaining = self.lock_quota().remaining(), "Brave results parsed");
                Ok(results)
            }
            Err(err) => {
                self.lock_quota().refund(permit);
                Err(err)
            }
        }
    }

    fn quota(&self) -> Option<QuotaSnapshot> {
        let mut quota = self.lock_quota();
        quota.refresh(Local::now());
        Some(quota.snapshot())
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    age: Option<String>,
}

/// Parse a Brave web search response body into results.
///
/// Extracted as a separate function for testability with fixture JSON.
pub(crate) fn parse_brave_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let response: BraveResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("brave: invalid JSON: {e}")))?;

    Ok(response
        .web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .take(max_results)
        .map(|r| {
            let result = SearchResult::new(r.title, r.url, r.description, NAME, BRAVE_RELEVANCE);
            match r.age {
                Some(age) => result.with_metadata("age", age),
                None => result,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "type": "search",
        "web": {
            "results": [
                {
                    "title": "The Go Programming Language",
                    "url": "https://go.dev/",
                    "description": "Go is an open source programming language.",
                    "age": "2 days ago"
                },
                {
                    "title": "A Tour of Go",
                    "url": "https://go.dev/tour/",
                    "description": "Welcome to a tour of the Go programming language."
                }
            ]
        }
    }"#;

    #[test]
    fn parse_fixture_returns_results() {
        let results = parse_brave_json(FIXTURE, 10).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "The Go Programming Language");
        assert_eq!(results[0].url, "https://go.dev/");
        assert_eq!(results[0].source, "brave");
        assert!((results[0].relevance - BRAVE_RELEVANCE).abs() < f64::EPSILON);
        assert_eq!(results[0].metadata["age"], "2 days ago");
        assert!(results[1].metadata.is_empty());
    }

    #[test]
    fn parse_respects_max_results() {
        let results = parse_brave_json(FIXTURE, 1).expect("should parse");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn parse_missing_web_section_is_empty() {
        let results = parse_brave_json(r#"{"type":"search"}"#, 10).expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn parse_malformed_json_is_error() {
        let err = parse_brave_json("<html>oops</html>", 10).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn unconfigured_provider_is_unavailable() {
        let provider = BraveProvider::new(BraveConfig::default()).expect("client");
        assert!(!provider.is_available());
    }

    #[test]
    fn configured_provider_is_available() {
        let provider = BraveProvider::new(BraveConfig::new("test-key")).expect("client");
        assert!(provider.is_available());
        assert_eq!(provider.name(), "brave");
        assert_eq!(provider.priority(), 1);
    }

    #[test]
    fn exhausted_quota_is_unavailable() {
        let provider =
            BraveProvider::new(BraveConfig::new("test-key").with_daily_quota(0)).expect("client");
        assert!(!provider.is_available());
    }

    #[test]
    fn past_reset_instant_restores_quota() {
        let past = Local
            .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
            .single()
            .expect("valid instant");
        let mut quota = DailyQuota::with_reset_at(3, past);
        let _a = quota.try_reserve(past - chrono::Duration::hours(1));
        let _b = quota.try_reserve(past - chrono::Duration::hours(1));
        let _c = quota.try_reserve(past - chrono::Duration::hours(1));
        assert_eq!(quota.remaining(), 0);

        let provider = BraveProvider::with_quota(BraveConfig::new("test-key"), quota).expect("client");
        assert!(provider.is_available());
        let snapshot = provider.quota().expect("metered");
        assert_eq!(snapshot.remaining, 3);
        assert!(snapshot.resets_at > Local::now());
    }

    #[tokio::test]
    async fn empty_query_returns_no_results_without_quota() {
        let provider =
            BraveProvider::new(BraveConfig::new("test-key").with_daily_quota(1)).expect("client");
        let cancel = CancellationToken::new();
        let results = provider.search(&cancel, "   ", 10).await.expect("empty ok");
        assert!(results.is_empty());
        assert_eq!(provider.quota().expect("metered").remaining, 1);
    }

    #[tokio::test]
    async fn search_without_key_is_unavailable_error() {
        let provider = BraveProvider::new(BraveConfig::default()).expect("client");
        let cancel = CancellationToken::new();
        let err = provider.search(&cancel, "golang", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn whitespace_key_counts_as_unconfigured() {
        let provider = BraveProvider::new(BraveConfig::new("  \t ")).expect("client");
        assert!(!provider.is_available());

        let cancel = CancellationToken::new();
        let err = provider.search(&cancel, "golang", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
        assert_eq!(provider.quota().expect("metered").remaining, 66);
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BraveProvider>();
    }

    #[tokio::test]
    #[ignore] // Live test. Run with BRAVE_API_KEY set and `cargo test -- --ignored`
    async fn live_brave_search() {
        let key = std::env::var("BRAVE_API_KEY").unwrap_or_default();
        let provider = BraveProvider::new(BraveConfig::new(key)).expect("client");
        let cancel = CancellationToken::new();
        let results = provider.search(&cancel, "rust programming", 5).await;
        let results = results.expect("live search should work");
        assert!(!results.is_empty());
    }
}
