//! Daily call quota for metered providers.
//!
//! A [`DailyQuota`] holds a fixed allowance that is restored in full at the
//! next local midnight. The reset only ever moves forward: the allowance is
//! reloaded when (and only when) the current instant has passed the stored
//! reset instant.
//!
//! Calls reserve a unit up front with [`DailyQuota::try_reserve`] and give it
//! back with [`DailyQuota::refund`] if the call fails, so only successful
//! calls consume quota and concurrent callers can never overshoot the limit.

use chrono::{DateTime, Days, Local, NaiveTime};
use serde::{Deserialize, Serialize};

/// Returns the first local midnight strictly after `now`.
///
/// Falls back to `now + 24h` when the local calendar has no such instant
/// (for example a DST gap exactly at midnight).
pub fn next_local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .zip(NaiveTime::from_hms_opt(0, 0, 0))
        .and_then(|(date, midnight)| date.and_time(midnight).and_local_timezone(Local).earliest())
        .unwrap_or_else(|| now + chrono::Duration::days(1))
}

/// Proof of a reserved quota unit, returned by [`DailyQuota::try_reserve`].
///
/// Dropping the permit keeps the unit consumed; pass it to
/// [`DailyQuota::refund`] to give it back.
#[derive(Debug)]
#[must_use = "a reserved quota unit is consumed unless refunded"]
pub struct QuotaPermit {
    period: u64,
}

/// Point-in-time view of a quota, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Calls allowed per day.
    pub limit: u32,
    /// Calls left before the next reset.
    pub remaining: u32,
    /// When the allowance is next restored.
    pub resets_at: DateTime<Local>,
}

/// A daily call allowance that resets at local midnight.
#[derive(Debug, Clone)]
pub struct DailyQuota {
    limit: u32,
    remaining: u32,
    resets_at: DateTime<Local>,
    // Bumped on every reset so stale refunds can be ignored.
    period: u64,
}

impl DailyQuota {
    /// Create a full quota whose first reset is the midnight after `now`.
    pub fn new(limit: u32, now: DateTime<Local>) -> Self {
        Self::with_reset_at(limit, next_local_midnight(now))
    }

    /// Create a full quota with an explicit first reset instant.
    pub fn with_reset_at(limit: u32, resets_at: DateTime<Local>) -> Self {
        Self {
            limit,
            remaining: limit,
            resets_at,
            period: 0,
        }
    }

    /// Reload the allowance if `now` has reached the reset instant.
    pub fn refresh(&mut self, now: DateTime<Local>) {
        if now >= self.resets_at {
            self.remaining = self.limit;
            self.resets_at = next_local_midnight(now);
            self.period += 1;
            tracing::debug!(limit = self.limit, resets_at = %self.resets_at, "quota reset");
        }
    }

    /// Whether at least one call is left, after applying any due reset.
    pub fn is_available(&mut self, now: DateTime<Local>) -> bool {
        self.refresh(now);
        self.remaining > 0
    }

    /// Reserve one call, or `None` if the quota is exhausted.
    pub fn try_reserve(&mut self, now: DateTime<Local>) -> Option<QuotaPermit> {
        self.refresh(now);
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(QuotaPermit {
            period: self.period,
        })
    }

    /// Give back a reserved call that did not complete successfully.
    ///
    /// Permits from an earlier period are ignored; the reset already
    /// restored the full allowance.
    pub fn refund(&mut self, permit: QuotaPermit) {
        if permit.period == self.period && self.remaining < self.limit {
            self.remaining += 1;
        }
    }

    /// Calls allowed per day.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Calls left before the next reset (without applying a due reset).
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// When the allowance is next restored.
    pub fn resets_at(&self) -> DateTime<Local> {
        self.resets_at
    }

    /// Point-in-time view for status reporting.
    pub fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            limit: self.limit,
            remaining: self.remaining,
            resets_at: self.resets_at,
        }
    }
}
