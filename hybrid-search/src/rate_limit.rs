//! Minimum-interval gate for providers that must not be hammered.
//!
//! The gate serialises call starts from this process: a caller takes the
//! lock, sleeps for whatever remains of the interval since the previous
//! call, records the new call instant and only then releases the lock.
//! Concurrent requests therefore queue up behind each other and start at
//! least `min_interval` apart.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;

/// Enforces a minimum wall-clock spacing between consecutive calls.
#[derive(Debug)]
pub struct MinIntervalGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    /// Create a gate with the given spacing. A zero interval never waits.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// The configured spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until this caller may start a call, then claim the slot.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires while waiting.
    /// A cancelled wait does not claim the slot.
    pub async fn wait_turn(&self, cancel: &CancellationToken) -> Result<(), SearchError> {
        let mut last_call = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            guard = self.last_call.lock() => guard,
        };

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::trace!(wait_ms = remaining.as_millis() as u64, "rate limit wait");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                    _ = tokio::time::sleep(remaining) => {}
                }
            }
        }

        *last_call = Some(Instant::now());
        Ok(())
    }
}
