//! Result deduplication by URL.
//!
//! Results sharing the same non-empty URL are merged and the entry with
//! the highest relevance is kept. Results without a URL are never merged,
//! so distinct non-web results cannot silently collapse into one.

use std::collections::HashMap;

use crate::types::SearchResult;

use super::rank::sort_key;

/// A result waiting to be merged, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The provider's result.
    pub result: SearchResult,
    /// Priority of the provider that produced it.
    pub priority: u32,
    /// Position in the concatenated provider output, used as the final tie-break.
    pub arrival: usize,
}

/// Collapse candidates that share a non-empty URL.
///
/// For each URL the candidate with the highest `relevance` survives; on
/// equal relevance the earlier arrival wins. A NaN relevance counts as the
/// lowest possible score, matching [`rank`](super::rank::rank). Output order follows the
/// first arrival of each URL, but callers should rank afterwards.
pub fn deduplicate(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut slot_by_url: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        let Some(url) = candidate.result.dedup_key() else {
            kept.push(candidate);
            continue;
        };

        match slot_by_url.get(url) {
            Some(&slot) => {
                if sort_key(candidate.result.relevance) > sort_key(kept[slot].result.relevance) {
                    kept[slot] = candidate;
                }
            }
            None => {
                slot_by_url.insert(url.to_string(), kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}
