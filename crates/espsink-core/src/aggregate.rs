//! Health aggregates over a store snapshot.
//!
//! None of these can fail. Missing or garbled metric values simply do not
//! count, so partial device data never takes the dashboard down.

use serde::{Deserialize, Serialize};

use crate::record::{MetricValue, metric};
use crate::store::Snapshot;

/// RSSI strictly above this (dBm) counts as "link up".
pub const RSSI_LINK_UP_DBM: f64 = -90.0;

/// Reset reason the firmware reports after a cold boot.
pub const POWER_ON_RESET: &str = "POWERON";

/// Mean I2C transaction latency in microseconds.
///
/// Zero, negative, missing or non-numeric readings are skipped: they mean the
/// transaction did not happen or was not reported. Returns `0.0` when no
/// record qualifies.
pub fn average_latency_us(snapshot: &Snapshot) -> f64 {
    let (sum, n) = snapshot
        .iter()
        .map(|r| r.metric_f64(metric::I2C_LATENCY_US).unwrap_or(0.0))
        .filter(|&v| v > 0.0)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Percentage of records whose Wi-Fi RSSI was above [`RSSI_LINK_UP_DBM`].
///
/// An empty snapshot is reported as fully up (`100.0`). Records without a
/// numeric `wifiRSSI` still count toward the total.
pub fn link_uptime_pct(snapshot: &Snapshot) -> f64 {
    if snapshot.is_empty() {
        return 100.0;
    }
    let ok = snapshot
        .iter()
        .filter(|r| {
            r.metric_f64(metric::WIFI_RSSI)
                .is_some_and(|rssi| rssi > RSSI_LINK_UP_DBM)
        })
        .count();
    ok as f64 * 100.0 / snapshot.len() as f64
}

/// Number of power-on resets beyond the first one.
///
/// The first `POWERON` is the boot that started the current session, so it is
/// not an unexpected restart. With no `POWERON` seen yet the result is `-1`:
/// no baseline. Callers decide how to display that; it is not clamped here.
pub fn unexpected_restarts(snapshot: &Snapshot) -> i64 {
    let power_ons = snapshot
        .iter()
        .filter(|r| {
            r.metric(metric::RESET_REASON)
                .and_then(MetricValue::as_text)
                .is_some_and(|reason| reason == POWER_ON_RESET)
        })
        .count();
    power_ons as i64 - 1
}

/// All dashboard aggregates computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// Records in the snapshot.
    pub records: usize,
    /// Mean positive I2C latency (µs), 0 if none.
    pub avg_i2c_latency_us: f64,
    /// Link-uptime ratio in percent.
    pub wifi_uptime_pct: f64,
    /// Power-on resets minus the session's own boot. May be `-1`.
    pub unexpected_restarts: i64,
}

impl HealthSummary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            records: snapshot.len(),
            avg_i2c_latency_us: average_latency_us(snapshot),
            wifi_uptime_pct: link_uptime_pct(snapshot),
            unexpected_restarts: unexpected_restarts(snapshot),
        }
    }

    /// True when a `POWERON` baseline has been observed.
    pub fn has_restart_baseline(&self) -> bool {
        self.unexpected_restarts >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TelemetryRecord;

    fn with_metric(name: &str, value: Option<MetricValue>) -> TelemetryRecord {
        let rec = TelemetryRecord::new(0);
        match value {
            Some(v) => rec.with_metric(name, v),
            None => rec,
        }
    }

    fn latency(values: &[Option<f64>]) -> Snapshot {
        Snapshot::from_records(values.iter().map(|v| {
            with_metric(metric::I2C_LATENCY_US, v.map(MetricValue::Number))
        }))
    }

    fn rssi(values: &[Option<f64>]) -> Snapshot {
        Snapshot::from_records(
            values
                .iter()
                .map(|v| with_metric(metric::WIFI_RSSI, v.map(MetricValue::Number))),
        )
    }

    fn resets(reasons: &[&str]) -> Snapshot {
        Snapshot::from_records(
            reasons
                .iter()
                .map(|r| TelemetryRecord::new(0).with_metric(metric::RESET_REASON, *r)),
        )
    }

    // -----------------------------------------------------------------------
    // Average latency
    // -----------------------------------------------------------------------

    #[test]
    fn latency_skips_zero_and_missing() {
        let snap = latency(&[Some(0.0), Some(100.0), Some(200.0), None]);
        assert!((average_latency_us(&snap) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn latency_empty_is_zero() {
        assert_eq!(average_latency_us(&Snapshot::default()), 0.0);
        assert_eq!(average_latency_us(&latency(&[None, Some(0.0)])), 0.0);
    }

    #[test]
    fn latency_ignores_negative_and_text() {
        let snap = Snapshot::from_records([
            with_metric(metric::I2C_LATENCY_US, Some(MetricValue::Number(-5.0))),
            with_metric(metric::I2C_LATENCY_US, Some("timeout".into())),
            with_metric(metric::I2C_LATENCY_US, Some("300".into())),
            with_metric(metric::I2C_LATENCY_US, Some(MetricValue::Number(500.0))),
        ]);
        assert!((average_latency_us(&snap) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn latency_ignores_non_finite_text() {
        let snap = Snapshot::from_records([
            with_metric(metric::I2C_LATENCY_US, Some(MetricValue::Number(100.0))),
            with_metric(metric::I2C_LATENCY_US, Some("inf".into())),
            with_metric(metric::I2C_LATENCY_US, Some("1e999".into())),
            with_metric(metric::I2C_LATENCY_US, Some(MetricValue::Number(200.0))),
        ]);
        assert!((average_latency_us(&snap) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn uptime_ignores_non_finite_rssi() {
        let snap = Snapshot::from_records([
            with_metric(metric::WIFI_RSSI, Some("infinity".into())),
            with_metric(metric::WIFI_RSSI, Some(MetricValue::Number(-60.0))),
        ]);
        assert!((link_uptime_pct(&snap) - 50.0).abs() < 1e-9);
    }

    // -----------------------------------------------------------------------
    // Link uptime
    // -----------------------------------------------------------------------

    #[test]
    fn uptime_empty_is_full() {
        assert_eq!(link_uptime_pct(&Snapshot::default()), 100.0);
    }

    #[test]
    fn uptime_counts_missing_in_total() {
        let snap = rssi(&[Some(-50.0), Some(-95.0), None]);
        assert!((link_uptime_pct(&snap) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn uptime_threshold_is_strict() {
        let snap = rssi(&[Some(-90.0), Some(-89.9)]);
        assert!((link_uptime_pct(&snap) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn uptime_all_good() {
        let snap = rssi(&[Some(-40.0), Some(-70.0)]);
        assert_eq!(link_uptime_pct(&snap), 100.0);
    }

    // -----------------------------------------------------------------------
    // Restarts
    // -----------------------------------------------------------------------

    #[test]
    fn restarts_without_baseline_is_negative() {
        assert_eq!(unexpected_restarts(&Snapshot::default()), -1);
        assert_eq!(unexpected_restarts(&resets(&["SW_RESET", "BROWNOUT"])), -1);
    }

    #[test]
    fn restarts_subtract_first_power_on() {
        assert_eq!(unexpected_restarts(&resets(&["POWERON"])), 0);
        assert_eq!(unexpected_restarts(&resets(&["POWERON", "POWERON"])), 1);
        assert_eq!(
            unexpected_restarts(&resets(&["POWERON", "SW_RESET", "POWERON", "POWERON"])),
            2
        );
    }

    #[test]
    fn restarts_match_is_exact() {
        assert_eq!(unexpected_restarts(&resets(&["poweron", "POWERON "])), -1);
    }

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------

    #[test]
    fn summary_bundles_all_three() {
        let snap = Snapshot::from_records([
            TelemetryRecord::new(1)
                .with_metric(metric::I2C_LATENCY_US, 900.0)
                .with_metric(metric::WIFI_RSSI, -60.0)
                .with_metric(metric::RESET_REASON, POWER_ON_RESET),
            TelemetryRecord::new(2).with_metric(metric::WIFI_RSSI, -92.0),
        ]);
        let s = HealthSummary::from_snapshot(&snap);
        assert_eq!(s.records, 2);
        assert_eq!(s.avg_i2c_latency_us, 900.0);
        assert_eq!(s.wifi_uptime_pct, 50.0);
        assert_eq!(s.unexpected_restarts, 0);
        assert!(s.has_restart_baseline());
    }

    #[test]
    fn summary_of_empty_snapshot() {
        let s = HealthSummary::from_snapshot(&Snapshot::default());
        assert_eq!(s.records, 0);
        assert_eq!(s.avg_i2c_latency_us, 0.0);
        assert_eq!(s.wifi_uptime_pct, 100.0);
        assert_eq!(s.unexpected_restarts, -1);
        assert!(!s.has_restart_baseline());
    }
}
