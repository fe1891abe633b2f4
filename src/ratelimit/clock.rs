//! Clock sources for rate-limit windows.
//!
//! `SystemClock` for production; `ManualClock` lets tests move time
//! explicitly so window rollover is deterministic.

use chrono::{DateTime, Duration, Utc};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Source of the current wall-clock time
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation using `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same underlying time, so a test can keep one handle
/// while the store owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a number of milliseconds
    pub fn advance_ms(&self, ms: i64) {
        let mut time = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *time += Duration::milliseconds(ms);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut time = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *time = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
