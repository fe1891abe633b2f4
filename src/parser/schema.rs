//! Typed result structures for insights queries.
//!
//! These are the shapes handed to the presentation layer and written to
//! JSON by the output module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reporting granularity and query window
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InsightMode {
    /// Three full calendar months, monthly points
    #[default]
    Monthly,

    /// Last 28 days, daily points
    #[value(name = "last28")]
    Last28,
}

impl InsightMode {
    /// Provider granularity parameter for this mode
    pub fn granularity(&self) -> &'static str {
        match self {
            InsightMode::Monthly => "monthly",
            InsightMode::Last28 => "daily",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightMode::Monthly => "monthly",
            InsightMode::Last28 => "last28",
        }
    }
}

impl fmt::Display for InsightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(InsightMode::Monthly),
            "last28" => Ok(InsightMode::Last28),
            other => Err(format!("Unknown insight mode: {}", other)),
        }
    }
}

/// One point of a metric series
///
/// `date` is `YYYY-MM` or `YYYY-MM-DD`; both sort correctly as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    pub date: String,
    pub value: f64,
}

impl TimeseriesPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// Traffic-source share, a fraction in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub share: f64,
}

impl ChannelShare {
    pub fn new(channel: impl Into<String>, share: f64) -> Self {
        Self {
            channel: channel.into(),
            share,
        }
    }
}

/// Latest value per metric; absent when the series is empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub visits: Option<f64>,
    pub bounce_rate: Option<f64>,
    pub pages_per_visit: Option<f64>,
    pub avg_duration: Option<f64>,
}

/// Partial-coverage metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub partial: bool,
    pub notes: Vec<String>,
}

impl Coverage {
    /// Partial iff any note exists or nothing at all was collected
    pub fn from_notes(notes: Vec<String>, all_empty: bool) -> Self {
        Self {
            partial: !notes.is_empty() || all_empty,
            notes,
        }
    }
}

/// Merged outcome of one aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsResult {
    pub summary: InsightsSummary,
    pub visits: Vec<TimeseriesPoint>,
    pub bounce_rate: Vec<TimeseriesPoint>,
    pub pages_per_visit: Vec<TimeseriesPoint>,
    pub avg_duration: Vec<TimeseriesPoint>,
    pub channels: Vec<ChannelShare>,
    pub coverage: Coverage,
}

impl InsightsResult {
    /// True when every collection is empty
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
            && self.bounce_rate.is_empty()
            && self.pages_per_visit.is_empty()
            && self.avg_duration.is_empty()
            && self.channels.is_empty()
    }
}
