//! The sink context: one store plus the moment the sink came up.
//!
//! Everything that used to be process-wide lives here and is passed
//! explicitly, so several independent sinks can coexist (tests do this).

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::aggregate::HealthSummary;
use crate::ingest::{self, MalformedPayload};
use crate::store::{Snapshot, TelemetryStore};

/// Owns the telemetry store and session start time.
#[derive(Debug)]
pub struct TelemetrySink {
    store: TelemetryStore,
    started: Instant,
    started_unix_ms: u64,
}

impl Default for TelemetrySink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink {
    pub fn new() -> Self {
        Self {
            store: TelemetryStore::new(),
            started: Instant::now(),
            started_unix_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }

    /// Normalize a raw body and append it. Returns the new record count.
    ///
    /// On rejection nothing is stored.
    pub fn ingest(&self, body: &[u8]) -> Result<usize, MalformedPayload> {
        match ingest::normalize(body) {
            Ok(record) => {
                let ts = record.timestamp;
                let n = self.store.append(record);
                log::debug!("accepted report ts={ts} (#{n})");
                Ok(n)
            }
            Err(e) => {
                log::warn!("rejected report: {e}");
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Aggregates over the current snapshot.
    pub fn health(&self) -> HealthSummary {
        HealthSummary::from_snapshot(&self.snapshot())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Time since this sink was created.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn started_unix_ms(&self) -> u64 {
        self.started_unix_ms
    }
}
