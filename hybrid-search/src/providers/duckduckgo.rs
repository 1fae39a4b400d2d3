//! DuckDuckGo search provider: keyless HTML scraping, rate limited.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`, which
//! requires no JavaScript. DuckDuckGo has no public web search API, so the
//! provider parses result markup with CSS selectors and spaces its own
//! outbound calls with a [`MinIntervalGate`] to stay polite.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;
use crate::rate_limit::MinIntervalGate;
use crate::types::SearchResult;

/// Default HTML endpoint root; requests go to `{base_url}/html/`.
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com";

/// Relevance prior for DuckDuckGo results.
pub const DUCKDUCKGO_RELEVANCE: f64 = 0.7;

/// Base used to resolve relative redirect links such as `/l/?uddg=...`.
const REDIRECT_BASE: &str = "https://duckduckgo.com";

/// Query parameter carrying the percent-encoded destination in redirect links.
const REDIRECT_PARAM: &str = "uddg";

const NAME: &str = "duckduckgo";

/// Configuration for [`DuckDuckGoProvider`].
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    /// HTML endpoint root, overridable for tests.
    pub base_url: String,
    /// Minimum spacing between outbound calls from this process.
    pub min_interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Custom User-Agent. If `None`, a realistic browser UA is picked from
    /// the built-in rotation list.
    pub user_agent: Option<String>,
    /// Registry ordering hint.
    pub priority: u32,
}

impl DuckDuckGoConfig {
    /// Override the endpoint root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the call spacing.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            base_url: DUCKDUCKGO_HTML_URL.to_string(),
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
            user_agent: None,
            priority: 2,
        }
    }
}

/// DuckDuckGo HTML search scraper.
pub struct DuckDuckGoProvider {
    config: DuckDuckGoConfig,
    gate: MinIntervalGate,
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    /// Create a provider.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn new(config: DuckDuckGoConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config.timeout, config.user_agent.as_deref())?;
        Ok(Self {
            gate: MinIntervalGate::new(config.min_interval),
            config,
            client,
        })
    }

    /// Extract the real destination from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `/l/?uddg=https%3A%2F%2Fexample.com` or
    /// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
    /// Direct absolute links pass through unchanged. Returns `None` for
    /// links that cannot be parsed.
    fn extract_url(href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = match Url::parse(&full_href) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) if full_href.starts_with('/') => {
                Url::parse(REDIRECT_BASE).ok()?.join(&full_href).ok()?
            }
            Err(_) => return None,
        };

        let is_redirect = parsed
            .host_str()
            .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
            && parsed.path().starts_with("/l/");

        if is_redirect {
            parsed
                .query_pairs()
                .find(|(key, _)| key == REDIRECT_PARAM)
                .map(|(_, value)| value.into_owned())
                .filter(|target| !target.is_empty())
        } else if full_href.starts_with('/') {
            None
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> u32 {
        self.config.priority
    }

    fn is_available(&self) -> bool {
        true
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

        self.gate.wait_turn(cancel).await?;

        tracing::trace!(query, "DuckDuckGo search");

        let request = self
            .client
            .get(format!("{}/html/", self.config.base_url.trim_end_matches('/')))
            .query(&[("q", query)])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9");

        let html = http::fetch_text(cancel, request, NAME).await?;
        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, max_results)
    }
}

/// Parse DuckDuckGo HTML response into search results.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(".result:not(.result--ad)")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;
    let display_url_sel = Selector::parse(".result__url")
        .map_err(|e| SearchError::Parse(format!("invalid display URL selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoProvider::extract_url)
        else {
            continue;
        };

        let description = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let mut result = SearchResult::new(title, url, description, NAME, DUCKDUCKGO_RELEVANCE);
        if let Some(display_url) = element
            .select(&display_url_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
        {
            result = result.with_metadata("display_url", display_url);
        }

        results.push(result);
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fgo.dev%2F&amp;rut=abc123">
        The Go Programming Language
    </a>
    <a class="result__url" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fgo.dev%2F">go.dev</a>
    <div class="result__snippet">
        Go is an open source programming language that makes it simple to build software.
    </div>
</div>
<div class="result results_links results_links_deep web-result result--ad">
    <a class="result__a" href="https://ads.example.com/">Sponsored (Ad)</a>
    <div class="result__snippet">Buy now.</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FGo_(programming_language)">
        Go (programming language) - Wikipedia
    </a>
    <div class="result__snippet">Go is a statically typed, compiled language.</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a">Link-less entry</a>
    <div class="result__snippet">No href at all.</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://pkg.go.dev/">   </a>
    <div class="result__snippet">Blank title.</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://gobyexample.com/">Go by Example</a>
</div>
</body>
</html>"#;

    #[test]
    fn extract_url_from_protocol_relative_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        let result = DuckDuckGoProvider::extract_url(href);
        assert_eq!(result, Some("https://example.com/page".to_string()));
    }

    #[test]
    fn extract_url_from_relative_redirect() {
        let href = "/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1";
        let result = DuckDuckGoProvider::extract_url(href);
        assert_eq!(result, Some("https://example.com/a?b=1".to_string()));
    }

    #[test]
    fn extract_url_direct_link() {
        let href = "https://example.com/direct";
        let result = DuckDuckGoProvider::extract_url(href);
        assert_eq!(result, Some("https://example.com/direct".to_string()));
    }

    #[test]
    fn extract_url_invalid() {
        assert!(DuckDuckGoProvider::extract_url("not-a-url").is_none());
        assert!(DuckDuckGoProvider::extract_url("").is_none());
    }

    #[test]
    fn extract_url_redirect_without_target() {
        assert!(DuckDuckGoProvider::extract_url("/l/?rut=abc").is_none());
    }

    #[test]
    fn parse_mock_html_returns_results() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "The Go Programming Language");
        assert_eq!(results[0].url, "https://go.dev/");
        assert!(results[0].description.contains("open source"));
        assert_eq!(results[0].source, "duckduckgo");
        assert_eq!(results[0].metadata["display_url"], "go.dev");
        assert!((results[0].relevance - DUCKDUCKGO_RELEVANCE).abs() < f64::EPSILON);

        assert_eq!(
            results[1].url,
            "https://en.wikipedia.org/wiki/Go_(programming_language)"
        );

        assert_eq!(results[2].title, "Go by Example");
        assert!(results[2].description.is_empty());
    }

    #[test]
    fn parse_excludes_ads() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        assert!(results.iter().all(|r| !r.title.contains("(Ad)")));
    }

    #[test]
    fn parse_respects_max_results() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 2).expect("should parse");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let results = parse_duckduckgo_html("<html><body></body></html>", 10).expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn provider_identity() {
        let provider = DuckDuckGoProvider::new(DuckDuckGoConfig::default()).expect("client");
        assert_eq!(provider.name(), "duckduckgo");
        assert_eq!(provider.priority(), 2);
        assert!(provider.is_available());
    }

    #[tokio::test]
    async fn empty_query_returns_empty_without_network() {
        let config = DuckDuckGoConfig::default().with_base_url("http://127.0.0.1:9");
        let provider = DuckDuckGoProvider::new(config).expect("client");
        let cancel = CancellationToken::new();
        let results = provider.search(&cancel, "", 10).await.expect("empty ok");
        assert!(results.is_empty());
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DuckDuckGoProvider>();
    }

    #[tokio::test]
    #[ignore] // Live test. Run with `cargo test -- --ignored`
    async fn live_duckduckgo_search() {
        let provider = DuckDuckGoProvider::new(DuckDuckGoConfig::default()).expect("client");
        let cancel = CancellationToken::new();
        let results = provider.search(&cancel, "rust programming", 5).await;
        let results = results.expect("live search should work");
        assert!(!results.is_empty());
        for r in &results {
            assert!(!r.title.is_empty());
            assert!(!r.url.is_empty());
        }
    }
}
