//! Request validation applied before a query reaches the aggregator.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{HybridError, Result};

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

/// Result count used when the caller asks for zero or fewer.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Upper bound on the result count.
pub const MAX_RESULTS_CAP: usize = 50;

fn tag_pattern() -> Option<&'static Regex> {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").ok()).as_ref()
}

/// Trim, bound and strip a raw query.
///
/// Markup tags and NUL bytes are removed. The length bound applies to the
/// trimmed input.
///
/// # Errors
///
/// Returns [`HybridError::InvalidQuery`] if the query is empty (before or
/// after stripping) or longer than [`MAX_QUERY_CHARS`].
pub fn sanitize_query(raw: &str) -> Result<String> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(HybridError::InvalidQuery("query cannot be empty".into()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(HybridError::InvalidQuery(format!(
            "query too long (max {MAX_QUERY_CHARS} characters)"
        )));
    }

    let stripped = match tag_pattern() {
        Some(tags) => tags.replace_all(query, "").into_owned(),
        None => query.to_string(),
    };
    let cleaned = stripped.replace('\0', "").trim().to_string();

    if cleaned.is_empty() {
        return Err(HybridError::InvalidQuery(
            "query is empty after removing markup".into(),
        ));
    }
    Ok(cleaned)
}

/// Clamp a requested result count into `1..=MAX_RESULTS_CAP`.
///
/// Zero or negative requests fall back to [`DEFAULT_MAX_RESULTS`].
pub fn clamp_max_results(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_MAX_RESULTS
    } else {
        usize::try_from(requested).map_or(MAX_RESULTS_CAP, |n| n.min(MAX_RESULTS_CAP))
    }
}
