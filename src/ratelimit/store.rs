//! Fixed-window counters keyed by caller identity.
//!
//! A window resets only when the clock passes `reset_at`, so a caller can
//! send `limit` requests just before a reset and `limit` more right after.
//! That burst of up to twice the limit across a boundary is accepted.

use super::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use log::debug;

/// Counter state for one caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,

    /// Whole seconds until `reset_at`, rounded up; 0 when allowed
    pub retry_after_secs: u64,
}

/// Storage seam for rate-limit counters
///
/// `check` must run its read-modify-write atomically per key.
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `key` against `limit` per `window_ms`
    fn check(&self, key: &str, limit: u32, window_ms: u64) -> RateDecision;

    /// Drop entries whose window already elapsed, returning how many went
    fn sweep(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store backed by a sharded concurrent map
///
/// DashMap's entry API holds the shard lock for the whole check-and-update,
/// so concurrent checks on one key never interleave.
#[derive(Debug)]
pub struct InMemoryRateStore<C: Clock = SystemClock> {
    entries: DashMap<String, RateLimitEntry>,
    clock: C,
}

impl InMemoryRateStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for InMemoryRateStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryRateStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Snapshot of one key's entry
    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e)
    }
}

impl<C: Clock> RateLimitStore for InMemoryRateStore<C> {
    fn check(&self, key: &str, limit: u32, window_ms: u64) -> RateDecision {
        let now = self.clock.now();
        let window = Duration::milliseconds(i64::try_from(window_ms).unwrap_or(i64::MAX));

        // A fresh entry starts expired so the branch below initializes it
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry { count: 0, reset_at: now });

        if now >= entry.reset_at {
            entry.count = 1;
            entry.reset_at = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
            return RateDecision {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_at: entry.reset_at,
                retry_after_secs: 0,
            };
        }

        if entry.count >= limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
                retry_after_secs: seconds_until(now, entry.reset_at),
            };
        }

        entry.count += 1;
        RateDecision {
            allowed: true,
            remaining: limit.saturating_sub(entry.count),
            reset_at: entry.reset_at,
            retry_after_secs: 0,
        }
    }

    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Swept {} expired rate-limit entries", removed);
        }
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Ceiling seconds between two instants, at least 1
///
/// **Private** - retry hint for denied checks
fn seconds_until(now: DateTime<Utc>, reset_at: DateTime<Utc>) -> u64 {
    let ms = (reset_at - now).num_milliseconds().max(0) as u64;
    ms.div_ceil(1000).max(1)
}
