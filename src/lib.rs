//! Domain Insights
//!
//! Partial-tolerant traffic and marketing insights for public domains.
//!
//! A query flows through four stages:
//! domain normalization, per-caller rate limiting, five concurrent
//! provider calls, and shape-tolerant parsing merged into one
//! `InsightsResult` with coverage notes for anything missing.
//!
//! ## Getting Started
//!
//! ```bash
//! PROVIDER_API_KEY=... domain-insights query --url example.com --summary
//! ```

pub mod aggregator;
pub mod commands;
pub mod domain;
pub mod output;
pub mod parser;
pub mod provider;
pub mod ratelimit;
pub mod utils;
