//! Endpoint catalogue and query parameters for the analytics provider.

use crate::parser::schema::InsightMode;
use crate::utils::config::{
    AVERAGE_DURATION_FIELD_NAMES, AVERAGE_DURATION_PATH, BOUNCE_RATE_FIELD_NAMES,
    BOUNCE_RATE_PATH, CHANNEL_FIELD_NAMES, CHANNEL_OVERVIEW_PATH, MONTHLY_WINDOW_MONTHS,
    PAGES_PER_VISIT_FIELD_NAMES, PAGES_PER_VISIT_PATH, VISITS_FIELD_NAMES, VISITS_PATH,
};
use chrono::{Datelike, Months, NaiveDate};

/// Raw provider payload (opaque until parsed)
///
/// Kept as `serde_json::Value` because the response shape drifts between
/// endpoints and over time. The parser handles that.
pub type RawPayload = serde_json::Value;

/// One of the five provider endpoints queried per aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Visits,
    BounceRate,
    PagesPerVisit,
    AverageDuration,
    ChannelOverview,
}

impl Endpoint {
    /// Fixed fold order; notes are emitted in this order
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Visits,
        Endpoint::BounceRate,
        Endpoint::PagesPerVisit,
        Endpoint::AverageDuration,
        Endpoint::ChannelOverview,
    ];

    /// Path under `{base}/{domain}/`
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Visits => VISITS_PATH,
            Endpoint::BounceRate => BOUNCE_RATE_PATH,
            Endpoint::PagesPerVisit => PAGES_PER_VISIT_PATH,
            Endpoint::AverageDuration => AVERAGE_DURATION_PATH,
            Endpoint::ChannelOverview => CHANNEL_OVERVIEW_PATH,
        }
    }

    /// Human-readable field name used in coverage notes
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Visits => "Visits",
            Endpoint::BounceRate => "Bounce rate",
            Endpoint::PagesPerVisit => "Pages per visit",
            Endpoint::AverageDuration => "Average duration",
            Endpoint::ChannelOverview => "Channel",
        }
    }

    /// Candidate payload keys, highest priority first
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Endpoint::Visits => VISITS_FIELD_NAMES,
            Endpoint::BounceRate => BOUNCE_RATE_FIELD_NAMES,
            Endpoint::PagesPerVisit => PAGES_PER_VISIT_FIELD_NAMES,
            Endpoint::AverageDuration => AVERAGE_DURATION_FIELD_NAMES,
            Endpoint::ChannelOverview => CHANNEL_FIELD_NAMES,
        }
    }

    pub fn unavailable_note(&self) -> String {
        format!("{} data unavailable", self.label())
    }
}

/// Parameters shared by all five requests of one aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub granularity: &'static str,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ProviderQuery {
    /// Build the query for a mode as of `today`
    ///
    /// Monthly mode pins the window to the three full calendar months
    /// before the current one.
    pub fn for_mode(mode: InsightMode, today: NaiveDate) -> Self {
        let (start_date, end_date) = match mode {
            InsightMode::Monthly => {
                let (start, end) = monthly_range(today);
                (Some(start), Some(end))
            }
            InsightMode::Last28 => (None, None),
        };

        Self {
            granularity: mode.granularity(),
            start_date,
            end_date,
        }
    }

    /// Query pairs without the credential
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("granularity", self.granularity.to_string())];
        if let Some(start) = &self.start_date {
            params.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date", end.clone()));
        }
        params
    }
}

/// `YYYY-MM` bounds of the full months preceding `today`'s month
///
/// **Public** - e.g. any day in April gives January..March
pub fn monthly_range(today: NaiveDate) -> (String, String) {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let start = first_of_month
        .checked_sub_months(Months::new(MONTHLY_WINDOW_MONTHS))
        .unwrap_or(first_of_month);
    let end = first_of_month
        .checked_sub_months(Months::new(1))
        .unwrap_or(first_of_month);

    (
        start.format("%Y-%m").to_string(),
        end.format("%Y-%m").to_string(),
    )
}
