//! Aggregation of provider responses into insights results.
//!
//! This module transforms five concurrent provider calls into:
//! - Four metric timeseries and a sorted channel breakdown
//! - A latest-value summary per metric
//! - Partial-coverage notes for every field that could not be filled

pub mod insights;
pub mod merge;

// Re-export main types and functions
pub use insights::InsightsAggregator;
pub use merge::{merge_outcomes, summarize, FieldOutcome};
