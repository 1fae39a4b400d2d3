//! Per-provider request counters for status reporting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::quota::QuotaSnapshot;

/// How one provider invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The provider answered successfully.
    Success,
    /// The provider returned an error (including cancellation).
    Failure,
    /// The provider was unavailable and was not invoked.
    Skipped,
}

/// Cumulative counters for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderStats {
    /// Invocations (successful or failed); skips are not counted.
    pub total_requests: u64,
    /// Invocations that returned results.
    pub successful_requests: u64,
    /// Invocations that returned an error, cancellation included.
    pub failed_requests: u64,
    /// Searches where the provider was unavailable at launch time.
    pub skipped_requests: u64,
    total_elapsed: Duration,
}

impl ProviderStats {
    fn record(&mut self, outcome: Outcome, elapsed: Duration) {
        match outcome {
            Outcome::Skipped => {
                self.skipped_requests += 1;
                return;
            }
            Outcome::Success => self.successful_requests += 1,
            Outcome::Failure => self.failed_requests += 1,
        }
        self.total_requests += 1;
        self.total_elapsed += elapsed;
    }

    /// Mean wall-clock time of invoked requests, in milliseconds.
    pub fn average_response_ms(&self) -> u64 {
        if self.total_requests == 0 {
            return 0;
        }
        let avg = self.total_elapsed.as_millis() / u128::from(self.total_requests);
        u64::try_from(avg).unwrap_or(u64::MAX)
    }
}

/// Thread-safe registry of [`ProviderStats`] keyed by provider name.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    inner: Mutex<HashMap<String, ProviderStats>>,
}

impl StatsRegistry {
    /// Record one outcome for `provider`.
    pub fn record(&self, provider: &str, outcome: Outcome, elapsed: Duration) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entry(provider.to_string()).or_default().record(outcome, elapsed);
    }

    /// Counters for `provider`; all zero if it has never been used.
    pub fn get(&self, provider: &str) -> ProviderStats {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.get(provider).cloned().unwrap_or_default()
    }
}

/// Status of one registered provider, as reported to operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    /// Registry name, e.g. `"brave"`.
    pub name: String,
    /// Ordering hint; lower runs first and wins relevance ties.
    pub priority: u32,
    /// Whether the provider would be invoked right now.
    pub available: bool,
    /// See [`ProviderStats::total_requests`].
    pub total_requests: u64,
    /// See [`ProviderStats::successful_requests`].
    pub successful_requests: u64,
    /// See [`ProviderStats::failed_requests`].
    pub failed_requests: u64,
    /// See [`ProviderStats::skipped_requests`].
    pub skipped_requests: u64,
    /// Mean latency of invoked requests in milliseconds.
    pub average_response_ms: u64,
    /// Present only for metered providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaSnapshot>,
}

impl ProviderStatus {
    pub(crate) fn from_stats(
        name: &str,
        priority: u32,
        available: bool,
        stats: &ProviderStats,
        quota: Option<QuotaSnapshot>,
    ) -> Self {
        Self {
            name: name.to_string(),
            priority,
            available,
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            skipped_requests: stats.skipped_requests,
            average_response_ms: stats.average_response_ms(),
            quota,
        }
    }
}
