//! Sample extraction from Prometheus API responses.
//!
//! Malformed samples are skipped so one bad entry never spoils a result.

use serde_json::Value;
use tracing::debug;

fn result_entries(body: &Value) -> &[Value] {
    body.get("data")
        .and_then(|data| data.get("result"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Parses a `[timestamp, "number"]` pair into its finite value.
fn pair_value(pair: &Value) -> Option<f64> {
    let raw = pair.as_array()?.get(1)?;
    let value = match raw {
        Value::String(s) => s.parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn pair_timestamp(pair: &Value) -> Option<f64> {
    pair.as_array()?.first()?.as_f64()
}

/// Value of the first well-formed sample, if any.
pub fn single_value(body: &Value) -> Option<f64> {
    result_entries(body)
        .iter()
        .find_map(|entry| entry.get("value").and_then(pair_value))
}

/// `(label value, sample value)` for every sample carrying `label`.
pub fn labeled_values(body: &Value, label: &str) -> Vec<(String, f64)> {
    result_entries(body)
        .iter()
        .filter_map(|entry| {
            let name = entry
                .get("metric")
                .and_then(|metric| metric.get(label))
                .and_then(Value::as_str);
            let value = entry.get("value").and_then(pair_value);

            match (name, value) {
                (Some(name), Some(value)) => Some((name.to_string(), value)),
                _ => {
                    debug!(label, sample = %entry, "Skipping malformed sample");
                    None
                }
            }
        })
        .collect()
}

/// `(unix seconds, value)` points of the first series in a range response.
pub fn range_points(body: &Value) -> Vec<(i64, f64)> {
    result_entries(body)
        .first()
        .and_then(|series| series.get("values"))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|pair| Some((pair_timestamp(pair)? as i64, pair_value(pair)?)))
                .collect()
        })
        .unwrap_or_default()
}
