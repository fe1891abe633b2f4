//! Shape-tolerant extraction of series and channel shares.
//!
//! Provider payloads put the same value in one of three places. Rather than
//! a fixed schema, each candidate key is probed against a small ordered
//! table of locations and the first non-empty match wins.

use super::schema::{ChannelShare, TimeseriesPoint};
use crate::utils::config::{CHANNEL_LABEL_FIELDS, CHANNEL_VALUE_FIELDS, DATE_FIELD, VALUE_FIELD};
use log::{debug, warn};
use serde_json::{Map, Value};

/// Where a candidate key may live inside a keyed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// `payload[key]`
    TopLevel,
    /// `payload.data[key]`
    UnderData,
    /// `payload[key].data`
    DataUnderKey,
}

/// Probe order; all three are tried before a key is given up
const PROBES: &[Probe] = &[Probe::TopLevel, Probe::UnderData, Probe::DataUnderKey];

impl Probe {
    fn locate<'a>(self, obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        match self {
            Probe::TopLevel => obj.get(key),
            Probe::UnderData => obj.get("data")?.as_object()?.get(key),
            Probe::DataUnderKey => obj.get(key)?.as_object()?.get("data"),
        }
    }
}

/// Find the array for `key` in a loosely structured payload
///
/// **Public** - building block for every field extraction
///
/// A payload that is already an array is returned as is.
pub fn extract_array<'a>(payload: &'a Value, key: &str) -> Option<&'a [Value]> {
    if let Some(items) = payload.as_array() {
        return Some(items.as_slice());
    }

    let obj = payload.as_object()?;
    PROBES.iter().find_map(|probe| {
        probe
            .locate(obj, key)
            .and_then(Value::as_array)
            .map(|items| {
                debug!("Found '{}' via {:?}", key, probe);
                items.as_slice()
            })
    })
}

/// Parse `{date, value}` elements, dropping nulls and malformed entries
///
/// **Public** - used by extract_timeseries and tests
pub fn parse_points(items: &[Value]) -> Vec<TimeseriesPoint> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let obj = item.as_object()?;
            let Some(date) = obj.get(DATE_FIELD).and_then(Value::as_str) else {
                warn!("Point {} has no date label, skipping", index);
                return None;
            };

            match obj.get(VALUE_FIELD) {
                Some(Value::Number(n)) => n.as_f64().map(|value| TimeseriesPoint::new(date, value)),
                Some(Value::Null) => None,
                other => {
                    warn!("Point {} ({}) has non-numeric value {:?}, skipping", index, date, other);
                    None
                }
            }
        })
        .collect()
}

/// Extract a metric series trying each key in priority order
///
/// **Public** - main entry point for timeseries parsing
///
/// # Arguments
/// * `payload` - Raw provider JSON
/// * `keys` - Candidate keys, highest priority first
///
/// # Returns
/// The first non-empty series, or `None` when no key yields a point
pub fn extract_timeseries(payload: &Value, keys: &[&str]) -> Option<Vec<TimeseriesPoint>> {
    let found = keys.iter().find_map(|key| {
        let points = parse_points(extract_array(payload, key)?);
        if points.is_empty() {
            debug!("Key '{}' matched but held no usable points", key);
            None
        } else {
            Some(points)
        }
    });

    if found.is_none() {
        debug!("No series found for keys {:?}", keys);
    }
    found
}

/// Convert a provider share to a fraction
///
/// **Public** - shared with the display layer so values are converted once
///
/// Values above 1 are percentages; values at or below 1 are already
/// fractions. The result is clamped to [0, 1].
pub fn normalize_share(value: f64) -> f64 {
    let share = if value > 1.0 { value / 100.0 } else { value };
    share.clamp(0.0, 1.0)
}

/// Extract channel shares from a list of objects or a flat mapping
///
/// **Public** - main entry point for channel parsing
///
/// # Arguments
/// * `payload` - Raw provider JSON
/// * `keys` - Candidate keys, highest priority first
///
/// # Returns
/// Normalized shares in payload order, or `None` if nothing usable was found
///
/// Each key is probed in the same three locations as series arrays; the
/// value found may be a list or a flat mapping. The payload itself is read
/// as a flat mapping only when none of the keys is present.
pub fn extract_channels(payload: &Value, keys: &[&str]) -> Option<Vec<ChannelShare>> {
    if let Some(items) = payload.as_array() {
        return non_empty(parse_channel_list(items));
    }

    let obj = payload.as_object()?;
    let found = keys.iter().find_map(|key| {
        PROBES.iter().find_map(|probe| {
            let shares = match probe.locate(obj, key)? {
                Value::Array(items) => parse_channel_list(items),
                Value::Object(map) => parse_channel_map(map),
                _ => return None,
            };
            if shares.is_empty() {
                None
            } else {
                debug!("Found channels under '{}' via {:?}", key, probe);
                Some(shares)
            }
        })
    });

    match found {
        Some(shares) => Some(shares),
        None if keys.iter().any(|key| obj.contains_key(*key)) => {
            debug!("Channel keys present but held no usable shares");
            None
        }
        None => non_empty(parse_channel_map(obj)),
    }
}

fn non_empty(shares: Vec<ChannelShare>) -> Option<Vec<ChannelShare>> {
    if shares.is_empty() {
        debug!("No channel shares found in payload");
        None
    } else {
        Some(shares)
    }
}

/// Parse `[{channel|source|name, share|value}]`
///
/// **Private** - internal helper for extract_channels
fn parse_channel_list(items: &[Value]) -> Vec<ChannelShare> {
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let label = first_field(obj, CHANNEL_LABEL_FIELDS, Value::as_str)?;
            let value = first_field(obj, CHANNEL_VALUE_FIELDS, Value::as_f64)?;
            Some(ChannelShare::new(label, normalize_share(value)))
        })
        .collect()
}

/// Parse `{ "search": 55, "direct": 20 }`, ignoring non-numeric entries
///
/// **Private** - internal helper for extract_channels
fn parse_channel_map(obj: &Map<String, Value>) -> Vec<ChannelShare> {
    obj.iter()
        .filter_map(|(name, value)| {
            value
                .as_f64()
                .map(|v| ChannelShare::new(name.as_str(), normalize_share(v)))
        })
        .collect()
}

fn first_field<'a, T>(
    obj: &'a Map<String, Value>,
    names: &[&str],
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    names.iter().find_map(|name| obj.get(*name).and_then(&read))
}

/// Sort channel shares, largest first
pub fn sort_channels(shares: &mut [ChannelShare]) {
    shares.sort_by(|a, b| b.share.total_cmp(&a.share));
}

/// Value of the point with the greatest date label
///
/// **Public** - summary computation; array order is irrelevant
pub fn latest_value(series: &[TimeseriesPoint]) -> Option<f64> {
    series
        .iter()
        .max_by(|a, b| a.date.cmp(&b.date))
        .map(|point| point.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_array_payload() {
        let payload = json!([{"date": "2024-01", "value": 1}]);
        assert_eq!(extract_array(&payload, "anything").unwrap().len(), 1);
    }

    #[test]
    fn test_probe_order() {
        // Top level wins over data-nested
        let payload = json!({
            "visits": [{"date": "2024-01", "value": 1}],
            "data": {"visits": [{"date": "2024-01", "value": 2}, {"date": "2024-02", "value": 3}]}
        });
        assert_eq!(extract_array(&payload, "visits").unwrap().len(), 1);
    }

    #[test]
    fn test_data_under_key() {
        let payload = json!({"visits": {"data": [{"date": "2024-01-03", "value": 7}]}});
        let points = extract_timeseries(&payload, &["visits"]).unwrap();
        assert_eq!(points, vec![TimeseriesPoint::new("2024-01-03", 7.0)]);
    }

    #[test]
    fn test_non_array_location_keeps_probing() {
        let payload = json!({"visits": "n/a", "data": {"visits": [{"date": "2024-01", "value": 4}]}});
        assert_eq!(extract_array(&payload, "visits").unwrap().len(), 1);
    }

    #[test]
    fn test_null_values_dropped() {
        let items = vec![
            json!({"date": "2024-01", "value": null}),
            json!({"date": "2024-02", "value": 5.5}),
            json!({"date": "2024-03", "value": "oops"}),
            json!({"value": 3}),
            json!(42),
        ];
        assert_eq!(parse_points(&items), vec![TimeseriesPoint::new("2024-02", 5.5)]);
    }

    #[test]
    fn test_all_null_key_falls_through() {
        let payload = json!({
            "bounce_rate": [{"date": "2024-01", "value": null}],
            "data": [{"date": "2024-01", "value": 0.4}]
        });
        let points = extract_timeseries(&payload, &["bounce_rate", "data"]).unwrap();
        assert_eq!(points[0].value, 0.4);
    }

    #[test]
    fn test_no_key_matches() {
        let payload = json!({"meta": {"status": "ok"}});
        assert!(extract_timeseries(&payload, &["visits", "data"]).is_none());
    }

    #[test]
    fn test_normalize_share() {
        assert_eq!(normalize_share(55.0), 0.55);
        assert_eq!(normalize_share(0.2), 0.2);
        assert_eq!(normalize_share(1.0), 1.0);
        assert_eq!(normalize_share(250.0), 1.0);
        assert_eq!(normalize_share(-0.3), 0.0);
    }

    const CHANNEL_KEYS: &[&str] = &["channels", "overview", "data"];

    #[test]
    fn test_channel_list_label_fallbacks() {
        let payload = json!([
            {"source": "Search", "value": 40},
            {"name": "Direct", "share": 0.3},
            {"channel": "Social"},
            {"share": 0.1}
        ]);
        let shares = extract_channels(&payload, CHANNEL_KEYS).unwrap();
        assert_eq!(
            shares,
            vec![ChannelShare::new("Search", 0.4), ChannelShare::new("Direct", 0.3)]
        );
    }

    #[test]
    fn test_channel_flat_map_under_data() {
        let payload = json!({"meta": {"v": 1}, "data": {"search": 60, "direct": 0.25}});
        let mut shares = extract_channels(&payload, CHANNEL_KEYS).unwrap();
        sort_channels(&mut shares);
        assert_eq!(shares[0], ChannelShare::new("search", 0.6));
        assert_eq!(shares[1], ChannelShare::new("direct", 0.25));
    }

    #[test]
    fn test_channels_missing() {
        assert!(extract_channels(&json!({"meta": {}}), CHANNEL_KEYS).is_none());
        assert!(extract_channels(&json!([]), CHANNEL_KEYS).is_none());
    }

    #[test]
    fn test_envelope_numbers_are_not_channels() {
        let payload = json!({"status": 200, "data": {"search": 60, "direct": 40}});
        let mut shares = extract_channels(&payload, CHANNEL_KEYS).unwrap();
        sort_channels(&mut shares);
        assert_eq!(
            shares,
            vec![ChannelShare::new("search", 0.6), ChannelShare::new("direct", 0.4)]
        );
    }

    #[test]
    fn test_channel_map_under_key() {
        let payload = json!({"channels": {"search": 55, "direct": 45}});
        assert_eq!(extract_channels(&payload, CHANNEL_KEYS).unwrap().len(), 2);

        let payload = json!({"overview": {"data": {"search": 55, "direct": 45}}});
        let mut shares = extract_channels(&payload, CHANNEL_KEYS).unwrap();
        sort_channels(&mut shares);
        assert_eq!(shares[0], ChannelShare::new("search", 0.55));
    }

    #[test]
    fn test_present_but_empty_key_does_not_fall_back_to_envelope() {
        let payload = json!({"status": 200, "data": {"note": "none"}});
        assert!(extract_channels(&payload, CHANNEL_KEYS).is_none());
    }

    #[test]
    fn test_latest_value() {
        let series = vec![
            TimeseriesPoint::new("2024-02", 10.0),
            TimeseriesPoint::new("2024-01", 5.0),
        ];
        assert_eq!(latest_value(&series), Some(10.0));
        assert_eq!(latest_value(&[]), None);
    }
}
