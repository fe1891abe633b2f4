//! Fold settled provider outcomes into one `InsightsResult`.
//!
//! Outcomes are folded in the order given. The aggregator passes them in
//! `Endpoint::ALL` order, which fixes the order of coverage notes.

use crate::parser::extract::{extract_channels, extract_timeseries, latest_value, sort_channels};
use crate::parser::schema::{Coverage, InsightsResult, InsightsSummary, TimeseriesPoint};
use crate::provider::types::{Endpoint, RawPayload};
use crate::utils::error::ProviderError;
use log::{debug, warn};

/// One settled request
pub type FieldOutcome = (Endpoint, Result<RawPayload, ProviderError>);

/// Merge settled outcomes into a result with coverage metadata
///
/// **Public** - main entry point for fan-in
///
/// Failed requests and parser misses each add one
/// `"<field> data unavailable"` note and leave the field empty.
pub fn merge_outcomes(outcomes: impl IntoIterator<Item = FieldOutcome>) -> InsightsResult {
    let mut result = InsightsResult::default();
    let mut notes = Vec::new();

    for (endpoint, outcome) in outcomes {
        let payload = match outcome {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{} request failed: {}", endpoint.label(), e);
                notes.push(endpoint.unavailable_note());
                continue;
            }
        };

        let parsed = match series_slot(&mut result, endpoint) {
            Some(slot) => extract_timeseries(&payload, endpoint.field_names())
                .map(|points| *slot = points)
                .is_some(),
            None => extract_channels(&payload, endpoint.field_names())
                .map(|mut shares| {
                    sort_channels(&mut shares);
                    result.channels = shares;
                })
                .is_some(),
        };

        if parsed {
            debug!("{} parsed", endpoint.label());
        } else {
            warn!("{} payload held no usable data", endpoint.label());
            notes.push(endpoint.unavailable_note());
        }
    }

    result.summary = summarize(&result);
    result.coverage = Coverage::from_notes(notes, result.is_empty());
    result
}

/// Latest value of each series; never fails
///
/// **Public** - also useful when a caller rebuilds a result by hand
pub fn summarize(result: &InsightsResult) -> InsightsSummary {
    InsightsSummary {
        visits: latest_value(&result.visits),
        bounce_rate: latest_value(&result.bounce_rate),
        pages_per_visit: latest_value(&result.pages_per_visit),
        avg_duration: latest_value(&result.avg_duration),
    }
}

/// Series field for a timeseries endpoint; `None` for channels
///
/// **Private** - internal helper for merge_outcomes
fn series_slot(result: &mut InsightsResult, endpoint: Endpoint) -> Option<&mut Vec<TimeseriesPoint>> {
    match endpoint {
        Endpoint::Visits => Some(&mut result.visits),
        Endpoint::BounceRate => Some(&mut result.bounce_rate),
        Endpoint::PagesPerVisit => Some(&mut result.pages_per_visit),
        Endpoint::AverageDuration => Some(&mut result.avg_duration),
        Endpoint::ChannelOverview => None,
    }
}
