//! Wikipedia search provider: keyless structured JSON API.
//!
//! Queries the MediaWiki `list=search` endpoint. The API returns titles and
//! HTML-highlighted snippets but no URLs, so page links are synthesised from
//! the title and snippets are cleaned before use.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;
use crate::types::SearchResult;

/// Default MediaWiki API endpoint.
pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Default site root used to build page links.
pub const WIKIPEDIA_SITE_URL: &str = "https://en.wikipedia.org";

/// Relevance prior for Wikipedia results.
pub const WIKIPEDIA_RELEVANCE: f64 = 0.8;

/// Matches any markup tag, e.g. `<span class="searchmatch">`.
const TAG_PATTERN: &str = r"<[^>]*>";

/// Bytes escaped in a page title path segment. Sub-delimiters that are
/// legal inside a path segment (`$&+,:;=@`) stay literal, so `C++` and
/// `Talk:Go` keep the form Wikipedia itself links to.
const TITLE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

const NAME: &str = "wikipedia";

fn tag_pattern() -> Result<&'static Regex, SearchError> {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(TAG_PATTERN).ok())
        .as_ref()
        .ok_or_else(|| SearchError::Parse("invalid tag pattern".into()))
}

/// Configuration for [`WikipediaProvider`].
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// MediaWiki API endpoint.
    pub api_url: String,
    /// Site root; page links are `{site_url}/wiki/{title}`.
    pub site_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Registry ordering hint.
    pub priority: u32,
}

impl WikipediaConfig {
    /// Point the provider at another API endpoint (tests, other wikis).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: WIKIPEDIA_API_URL.to_string(),
            site_url: WIKIPEDIA_SITE_URL.to_string(),
            timeout: Duration::from_secs(10),
            priority: 3,
        }
    }
}

/// Wikipedia full-text search provider.
pub struct WikipediaProvider {
    config: WikipediaConfig,
    client: reqwest::Client,
}

impl WikipediaProvider {
    /// Create a provider.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn new(config: WikipediaConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config.timeout, None)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SearchProvider for WikipediaProvider {
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

        tracing::trace!(query, "Wikipedia search");

        let limit = max_results.to_string();
        let request = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .header("Accept", "application/json");

        let body = http::fetch_text(cancel, request, NAME).await?;
        tracing::trace!(bytes = body.len(), "Wikipedia response received");

        parse_wikipedia_json(&body, &self.config.site_url, max_results)
    }
}

#[derive(Debug, Deserialize)]
struct WikiSearchResponse {
    #[serde(default)]
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    search: Vec<WikiHit>,
}

#[derive(Debug, Deserialize)]
struct WikiHit {
    title: String,
    #[serde(default)]
    snippet: String,
    pageid: Option<u64>,
    wordcount: Option<u64>,
    timestamp: Option<String>,
}

/// Build the canonical page link for an article title.
///
/// Spaces become underscores and the title is escaped as one path
/// segment, so `Go (programming language)` maps to
/// `{site}/wiki/Go_%28programming_language%29` and `C++` to `{site}/wiki/C++`.
pub fn page_url(site_url: &str, title: &str) -> String {
    let slug = title.replace(' ', "_");
    format!(
        "{}/wiki/{}",
        site_url.trim_end_matches('/'),
        utf8_percent_encode(&slug, TITLE_SEGMENT)
    )
}

/// Strip markup tags and decode the handful of entities MediaWiki emits.
///
/// `&amp;` is decoded last so that an escaped entity such as `&amp;lt;`
/// yields the literal text `&lt;` rather than `<`.
fn clean_snippet(tags: &Regex, snippet: &str) -> String {
    tags.replace_all(snippet, "")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Parse a MediaWiki search response body into results.
///
/// Extracted as a separate function for testability with fixture JSON.
pub(crate) fn parse_wikipedia_json(
    body: &str,
    site_url: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let response: WikiSearchResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("wikipedia: invalid JSON: {e}")))?;
    let tags = tag_pattern()?;

    let results: Vec<SearchResult> = response
        .query
        .map(|q| q.search)
        .unwrap_or_default()
        .into_iter()
        .take(max_results)
        .map(|hit| {
            let url = page_url(site_url, &hit.title);
            let description = clean_snippet(tags, &hit.snippet);
            let mut result = SearchResult::new(hit.title, url, description, NAME, WIKIPEDIA_RELEVANCE);
            if let Some(pageid) = hit.pageid {
                result = result.with_metadata("pageid", pageid);
            }
            if let Some(wordcount) = hit.wordcount {
                result = result.with_metadata("wordcount", wordcount);
            }
            if let Some(timestamp) = hit.timestamp {
                result = result.with_metadata("timestamp", timestamp);
            }
            result
        })
        .collect();

    tracing::debug!(count = results.len(), "Wikipedia results parsed");
    Ok(results)
}
