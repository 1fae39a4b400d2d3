//! Core types for search results and aggregated responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single search result produced by a provider.
///
/// Results are immutable once produced: the aggregator only selects,
/// reorders and truncates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result.
    pub title: String,
    /// Landing URL. Empty for sources that are not URL-addressable.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// A text snippet describing the result.
    pub description: String,
    /// Name of the provider that produced this result.
    pub source: String,
    /// Provider-assigned relevance prior (higher is better).
    pub relevance: f64,
    /// Provider-specific extras (page id, age, display URL, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl SearchResult {
    /// Create a result with no metadata.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
        relevance: f64,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
            source: source.into(),
            relevance,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The key used to collapse duplicates across providers.
    ///
    /// Only non-empty URLs are dedup keys; results without a URL are
    /// always treated as distinct.
    pub fn dedup_key(&self) -> Option<&str> {
        if self.url.is_empty() {
            None
        } else {
            Some(&self.url)
        }
    }
}

/// The merged answer to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    /// The query as handed to the aggregator.
    pub query: String,
    /// Deduplicated results, sorted by relevance descending.
    pub results: Vec<SearchResult>,
    /// Number of entries in `results`.
    pub count: usize,
    /// Providers that were invoked and answered successfully, in priority order.
    pub sources_used: Vec<String>,
}

impl AggregatedResponse {
    /// Build a response; `count` is derived from `results`.
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>, sources_used: Vec<String>) -> Self {
        Self {
            query: query.into(),
            count: results.len(),
            results,
            sources_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_construction() {
        let result = SearchResult::new(
            "Example",
            "https://example.com",
            "An example page",
            "brave",
            0.9,
        );
        assert_eq!(result.title, "Example");
        assert_eq!(result.source, "brave");
        assert!((result.relevance - 0.9).abs() < f64::EPSILON);
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn dedup_key_requires_non_empty_url() {
        let with_url = SearchResult::new("a", "https://a.com", "", "brave", 0.9);
        let without_url = SearchResult::new("b", "", "", "notes", 0.5);
        assert_eq!(with_url.dedup_key(), Some("https://a.com"));
        assert_eq!(without_url.dedup_key(), None);
    }

    #[test]
    fn metadata_builder_inserts_values() {
        let result = SearchResult::new("t", "https://t.com", "d", "wikipedia", 0.8)
            .with_metadata("pageid", 42)
            .with_metadata("timestamp", "2024-01-01T00:00:00Z");
        assert_eq!(result.metadata.len(), 2);
        assert_eq!(result.metadata["pageid"], serde_json::json!(42));
    }

    #[test]
    fn empty_url_and_metadata_are_omitted_from_json() {
        let result = SearchResult::new("Note", "", "local note", "personal", 0.5);
        let json = serde_json::to_value(&result).expect("serialize");
        assert!(json.get("url").is_none());
        assert!(json.get("metadata").is_none());
        assert_eq!(json["source"], "personal");
    }

    #[test]
    fn search_result_deserializes_without_optional_fields() {
        let json = r#"{"title":"T","description":"D","source":"brave","relevance":0.9}"#;
        let decoded: SearchResult = serde_json::from_str(json).expect("deserialize");
        assert!(decoded.url.is_empty());
        assert!(decoded.metadata.is_empty());
    }

    #[test]
    fn aggregated_response_count_matches_results() {
        let results = vec![
            SearchResult::new("a", "https://a.com", "", "brave", 0.9),
            SearchResult::new("b", "https://b.com", "", "wikipedia", 0.8),
        ];
        let response = AggregatedResponse::new("golang", results, vec!["brave".into()]);
        assert_eq!(response.count, 2);
        assert_eq!(response.query, "golang");
        assert_eq!(response.sources_used, vec!["brave".to_string()]);
    }

    #[test]
    fn aggregated_response_serializes_expected_fields() {
        let response = AggregatedResponse::new("q", vec![], vec![]);
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["count"], 0);
        assert!(json["results"].as_array().is_some_and(|r| r.is_empty()));
        assert!(json["sources_used"].as_array().is_some());
    }
}
