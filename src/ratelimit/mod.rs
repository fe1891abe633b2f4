//! Per-caller request-rate governor.
//!
//! This module handles:
//! - Fixed-window counting per caller identity
//! - Opportunistic sweeping of expired windows
//! - Deriving caller identity from forwarded-IP headers

pub mod clock;
pub mod governor;
pub mod store;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use governor::{client_identity, RateGovernor};
pub use store::{InMemoryRateStore, RateDecision, RateLimitEntry, RateLimitStore};
