// Mapper from upstream history payloads to domain models
use crate::domain::metric::{MetricDescriptor, ValueKind};
use crate::domain::series::{MetricHistory, RawSample};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Field names the upstream uses for a sample's figure, by table
const VALUE_FIELDS: [&str; 3] = ["value", "total", "duration"];

#[derive(Debug, Deserialize)]
struct CumulativePayload {
    data: Option<Vec<Value>>,
    #[serde(default)]
    total: Option<Value>,
}

/// Map a history payload according to the metric's value kind.
///
/// Measurement metrics arrive as a bare array of samples, cumulative ones as
/// `{"data": [...], "total": n}`. Anything else is a shape error.
pub fn history_from_payload(metric: &MetricDescriptor, payload: Value) -> Result<MetricHistory> {
    match metric.value_kind {
        ValueKind::Measurement => {
            let Value::Array(items) = payload else {
                anyhow::bail!("Invalid response format for {}", metric.id);
            };
            Ok(MetricHistory::Measurement(samples_from_items(&items)))
        }
        ValueKind::Cumulative => {
            if !payload.is_object() {
                anyhow::bail!("Invalid response format for {}", metric.id);
            }
            let parsed: CumulativePayload = serde_json::from_value(payload)
                .with_context(|| format!("Invalid response format for {}", metric.id))?;
            let data = parsed
                .data
                .with_context(|| format!("Invalid response format for {}", metric.id))?;
            Ok(MetricHistory::Cumulative {
                data: samples_from_items(&data),
                total: parsed.total.as_ref().and_then(number_from),
            })
        }
    }
}

fn samples_from_items(items: &[Value]) -> Vec<RawSample> {
    items.iter().map(sample_from_item).collect()
}

/// Malformed samples are kept; an unreadable figure becomes NaN for the
/// formatter to zero out.
fn sample_from_item(item: &Value) -> RawSample {
    let date = match item.get("date") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let value = VALUE_FIELDS
        .iter()
        .find_map(|field| item.get(*field))
        .and_then(number_from)
        .unwrap_or(f64::NAN);
    RawSample::new(date, value)
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
