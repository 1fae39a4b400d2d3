//! Trait definition for pluggable search providers.
//!
//! Each backend (Brave, DuckDuckGo, Wikipedia) implements
//! [`SearchProvider`] so the aggregator can hold them behind one
//! `Arc<dyn SearchProvider>` registry without knowing concrete types.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::quota::QuotaSnapshot;
use crate::types::SearchResult;

/// A pluggable search backend.
///
/// Providers are created once at startup and shared across every request,
/// so any gating state they carry (quota counters, rate-limit timestamps)
/// must live behind the provider's own lock.
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable identifier, used as the registry key and in allow-lists.
    fn name(&self) -> &str;

    /// Ordering hint; lower sorts first.
    fn priority(&self) -> u32;

    /// Cheap availability check, called before every search attempt.
    ///
    /// May lazily reset time-based gates (for example a daily quota that
    /// has passed its reset instant) but has no other side effects.
    fn is_available(&self) -> bool;

    /// Perform the remote lookup.
    ///
    /// Implementations must return [`SearchError::Cancelled`] promptly once
    /// `cancel` fires, and must return an empty list (not an error) for an
    /// empty query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failure, non-success status,
    /// malformed payload, cancellation, or when called while unavailable.
    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;

    /// Current quota state, for providers that are metered.
    fn quota(&self) -> Option<QuotaSnapshot> {
        None
    }
}
