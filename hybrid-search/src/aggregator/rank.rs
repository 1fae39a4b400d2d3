//! Final ordering and truncation of merged results.

use crate::types::SearchResult;

use super::dedup::Candidate;

/// Sort candidates best-first and keep at most `max_results`.
///
/// Order: relevance descending, then provider priority ascending, then
/// arrival ascending. A NaN relevance sorts last.
pub fn rank(mut candidates: Vec<Candidate>, max_results: usize) -> Vec<SearchResult> {
    candidates.sort_by(|a, b| {
        sort_key(b.result.relevance)
            .total_cmp(&sort_key(a.result.relevance))
            .then(a.priority.cmp(&b.priority))
            .then(a.arrival.cmp(&b.arrival))
    });
    candidates.truncate(max_results);
    candidates.into_iter().map(|c| c.result).collect()
}

/// Relevance as an ordering key: NaN maps to negative infinity so it never
/// beats a real score.
pub(crate) fn sort_key(relevance: f64) -> f64 {
    if relevance.is_nan() {
        f64::NEG_INFINITY
    } else {
        relevance
    }
}
