//! Normalized telemetry record.
//!
//! A record is what the device reported in one POST, after normalization:
//! the device timestamp, numeric sensor readings, and heterogeneous metrics.
//! Records are immutable once they reach the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sensor keys the views know how to label.
pub mod sensor {
    pub const TEMP: &str = "temp";
    pub const HUM: &str = "hum";
    pub const MQ_VOLT: &str = "mqVolt";
    pub const UV_VOLT: &str = "uvVolt";
    pub const VBAT: &str = "vbat";
}

/// Metric keys consumed by the aggregates and views.
pub mod metric {
    pub const I2C_LATENCY_US: &str = "i2cLatencyUs";
    pub const WIFI_RSSI: &str = "wifiRSSI";
    pub const WIFI_BYTES_SENT: &str = "wifiBytesSent";
    pub const WIFI_BYTES_RECV: &str = "wifiBytesRecv";
    pub const COMM_ERRORS: &str = "commErrors";
    pub const RESET_REASON: &str = "resetReason";
}

/// A metric value as reported by the device.
///
/// Numbers stay numbers, strings stay strings. Anything structured (objects,
/// arrays, booleans, null) is kept as its canonical JSON text so a single odd
/// metric never costs the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric reading of this value, if it has one.
    ///
    /// Text that parses as a number (e.g. `"-71"`) counts as numeric.
    /// Infinities and NaN never do, whichever way they arrived.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        n.filter(|v| v.is_finite())
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One normalized device report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Device-supplied epoch milliseconds. Not checked for range or order.
    #[serde(rename = "ts")]
    pub timestamp: i64,
    #[serde(default)]
    pub sensors: BTreeMap<String, f64>,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricValue>,
}

impl TelemetryRecord {
    /// Empty record at the given timestamp.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// Builder-style sensor insert.
    pub fn with_sensor(mut self, name: impl Into<String>, value: f64) -> Self {
        self.sensors.insert(name.into(), value);
        self
    }

    /// Builder-style metric insert.
    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    pub fn sensor(&self, name: &str) -> Option<f64> {
        self.sensors.get(name).copied()
    }

    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// Numeric reading of a metric; absent or non-numeric gives `None`.
    pub fn metric_f64(&self, name: &str) -> Option<f64> {
        self.metric(name).and_then(MetricValue::as_f64)
    }
}
