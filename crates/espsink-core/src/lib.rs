//! # espsink-core
//!
//! Ingestion and aggregation engine for an ESP32 telemetry sink.
//!
//! The device POSTs small JSON reports; this crate normalizes them into
//! [`TelemetryRecord`]s, keeps them in an append-only in-memory
//! [`TelemetryStore`], and computes the health aggregates the dashboard shows.
//!
//! ## Quick Start
//!
//! ```
//! use espsink_core::TelemetrySink;
//!
//! let sink = TelemetrySink::new();
//! sink.ingest(br#"{"ts":1,"metrics":{"wifiRSSI":-60,"resetReason":"POWERON"}}"#)
//!     .unwrap();
//!
//! let health = sink.health();
//! assert_eq!(health.records, 1);
//! assert_eq!(health.wifi_uptime_pct, 100.0);
//! assert_eq!(health.unexpected_restarts, 0);
//! ```
//!
//! ## Architecture
//!
//! Report → [`normalize`] → [`TelemetryStore::append`]
//!
//! Dashboard → [`TelemetryStore::snapshot`] → [`HealthSummary`]
//!
//! The store never evicts; memory grows with the number of reports for the
//! lifetime of the process.

pub mod aggregate;
pub mod host;
pub mod ingest;
pub mod record;
pub mod sink;
pub mod store;

pub use aggregate::{
    HealthSummary, POWER_ON_RESET, RSSI_LINK_UP_DBM, average_latency_us, link_uptime_pct,
    unexpected_restarts,
};
pub use host::HostSnapshot;
pub use ingest::{MalformedPayload, normalize, normalize_value};
pub use record::{MetricValue, TelemetryRecord};
pub use sink::TelemetrySink;
pub use store::{Snapshot, TelemetryStore};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
