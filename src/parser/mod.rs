//! Provider payload parsing and result schema.
//!
//! This module handles:
//! - Locating arrays in loosely structured provider JSON
//! - Extracting typed timeseries points and channel shares
//! - Defining the result schema handed to callers

pub mod extract;
pub mod schema;

// Re-export main types
pub use extract::{
    extract_array, extract_channels, extract_timeseries, latest_value, normalize_share,
    parse_points, sort_channels,
};
pub use schema::{ChannelShare, Coverage, InsightMode, InsightsResult, InsightsSummary, TimeseriesPoint};
