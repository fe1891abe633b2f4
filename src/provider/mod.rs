//! Outbound access to the analytics provider.

pub mod client;
pub mod types;

pub use client::{InsightsSource, ProviderClient};
pub use types::{monthly_range, Endpoint, ProviderQuery, RawPayload};
