//! Inbound payload normalization.
//!
//! Turns the loosely structured JSON the device POSTs into a
//! [`TelemetryRecord`]. The rules are deliberately asymmetric:
//!
//! - `ts` is mandatory and must be an integer.
//! - `sensors` must be numeric; one bad reading rejects the report.
//! - `metrics` never reject: numbers and strings are kept as such, anything
//!   else is stored as its JSON text.
//!
//! Missing `sensors` / `metrics` objects are simply empty. Unknown top-level
//! fields are ignored.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{MetricValue, TelemetryRecord};

/// Why a payload was rejected. Every variant means "nothing was stored".
#[derive(Debug, Error)]
pub enum MalformedPayload {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("top-level JSON value is not an object")]
    NotAnObject,
    #[error("missing required field `ts`")]
    MissingTimestamp,
    #[error("field `ts` is not an integer: {0}")]
    InvalidTimestamp(Value),
    #[error("field `{field}` is not an object")]
    NotAMap { field: &'static str },
    #[error("sensor `{name}` is not numeric: {value}")]
    NonNumericSensor { name: String, value: Value },
}

/// Parse and normalize a raw request body.
pub fn normalize(body: &[u8]) -> Result<TelemetryRecord, MalformedPayload> {
    let value: Value = serde_json::from_slice(body)?;
    normalize_value(value)
}

/// Normalize an already-parsed JSON value.
pub fn normalize_value(value: Value) -> Result<TelemetryRecord, MalformedPayload> {
    let Value::Object(mut obj) = value else {
        return Err(MalformedPayload::NotAnObject);
    };

    let timestamp = match obj.remove("ts") {
        None => return Err(MalformedPayload::MissingTimestamp),
        Some(ts) => ts.as_i64().ok_or(MalformedPayload::InvalidTimestamp(ts))?,
    };

    let sensors = match take_map(&mut obj, "sensors")? {
        Some(map) => normalize_sensors(map)?,
        None => BTreeMap::new(),
    };
    let metrics = take_map(&mut obj, "metrics")?
        .map(normalize_metrics)
        .unwrap_or_default();

    Ok(TelemetryRecord {
        timestamp,
        sensors,
        metrics,
    })
}

/// Remove an optional nested object. Present-but-not-an-object is an error.
fn take_map(
    obj: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<Map<String, Value>>, MalformedPayload> {
    match obj.remove(field) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(MalformedPayload::NotAMap { field }),
    }
}

fn normalize_sensors(map: Map<String, Value>) -> Result<BTreeMap<String, f64>, MalformedPayload> {
    map.into_iter()
        .map(|(name, value)| match sensor_reading(&value) {
            Some(v) => Ok((name, v)),
            None => Err(MalformedPayload::NonNumericSensor { name, value }),
        })
        .collect()
}

/// Numbers, or strings holding a finite number (firmware sometimes quotes them).
fn sensor_reading(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn normalize_metrics(map: Map<String, Value>) -> BTreeMap<String, MetricValue> {
    map.into_iter()
        .map(|(name, value)| {
            let metric = match value {
                // Out-of-range numbers (`1e999`) keep their literal text.
                Value::Number(n) => match n.as_f64() {
                    Some(v) => MetricValue::Number(v),
                    None => MetricValue::Text(n.to_string()),
                },
                Value::String(s) => MetricValue::Text(s),
                other => MetricValue::Text(other.to_string()),
            };
            (name, metric)
        })
        .collect()
}
