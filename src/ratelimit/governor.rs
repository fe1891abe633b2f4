//! Admission control for insights queries.

use super::store::{InMemoryRateStore, RateDecision, RateLimitStore};
use crate::utils::config::{CLIENT_IP_HEADERS, DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW_MS, UNKNOWN_CLIENT};
use crate::utils::error::InsightsError;
use log::{debug, warn};
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// Bounds how many aggregation requests one caller may issue per window
///
/// The store is injected so a distributed backend can replace the
/// in-memory map without touching call sites.
#[derive(Clone)]
pub struct RateGovernor {
    store: Arc<dyn RateLimitStore>,
    limit: u32,
    window_ms: u64,
}

impl RateGovernor {
    pub fn new(store: Arc<dyn RateLimitStore>, limit: u32, window_ms: u64) -> Self {
        Self {
            store,
            limit,
            window_ms,
        }
    }

    /// Process-local governor with the default limit and window
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRateStore::new()),
            DEFAULT_RATE_LIMIT,
            DEFAULT_RATE_WINDOW_MS,
        )
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Admit or reject one request from `key`
    ///
    /// **Public** - called once per query, before any provider traffic
    ///
    /// Sweeps expired entries first; the sweep is housekeeping only.
    ///
    /// # Errors
    /// * `InsightsError::RateLimited` - carries the retry hint in seconds
    pub fn admit(&self, key: &str) -> Result<RateDecision, InsightsError> {
        self.store.sweep();

        let decision = self.store.check(key, self.limit, self.window_ms);
        if decision.allowed {
            debug!("Admitted '{}' ({} remaining)", key, decision.remaining);
            Ok(decision)
        } else {
            warn!(
                "Rate limit exceeded for '{}', retry after {}s",
                key, decision.retry_after_secs
            );
            Err(InsightsError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            })
        }
    }
}

/// Derive the caller identity from forwarded-client-IP headers
///
/// **Public** - callers without any such header share the `unknown` bucket
pub fn client_identity(headers: &HeaderMap) -> String {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use reqwest::header::HeaderValue;

    #[test]
    fn test_forwarded_for_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));

        assert_eq!(client_identity(&headers), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));

        assert_eq!(client_identity(&headers), "198.51.100.2");
    }

    #[test]
    fn test_unknown_bucket() {
        assert_eq!(client_identity(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_admit_sweeps_expired_entries() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let store = Arc::new(InMemoryRateStore::with_clock(clock.clone()));
        let governor = RateGovernor::new(store.clone(), 2, 1000);

        governor.admit("a").unwrap();
        clock.advance_ms(1000);
        governor.admit("b").unwrap();

        assert!(store.entry("a").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_admit_rejects_with_retry_hint() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let store = Arc::new(InMemoryRateStore::with_clock(clock.clone()));
        let governor = RateGovernor::new(store, 1, 30_000);

        governor.admit("a").unwrap();
        match governor.admit("a") {
            Err(InsightsError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 30),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }
}
