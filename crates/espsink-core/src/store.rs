//! Append-only, insertion-ordered telemetry store.
//!
//! One coarse `RwLock` guards the record vector. Appends take the write lock
//! for a single `push`; snapshots take the read lock just long enough to clone
//! the `Arc` handles, so readers iterate a private copy that later appends
//! cannot disturb.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Serialize, Serializer};

use crate::record::TelemetryRecord;

/// Thread-safe append-only record store.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    records: RwLock<Vec<Arc<TelemetryRecord>>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end. Returns the store length after the append.
    pub fn append(&self, record: TelemetryRecord) -> usize {
        let record = Arc::new(record);
        // A panic while holding the lock cannot leave the vector half-pushed,
        // so a poisoned lock is still safe to use.
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push(record);
        records.len()
    }

    /// Point-in-time copy of every record, in insertion order.
    pub fn snapshot(&self) -> Snapshot {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            records: records.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable view of the store at one instant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<Arc<TelemetryRecord>>,
}

impl Snapshot {
    /// Build a snapshot directly from records (useful for tests and replay).
    pub fn from_records(records: impl IntoIterator<Item = TelemetryRecord>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TelemetryRecord> {
        self.records.get(index).map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TelemetryRecord> {
        self.records.iter().map(Arc::as_ref)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = TelemetryStore::new();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let store = TelemetryStore::new();
        // Timestamps deliberately out of order: insertion order wins.
        for ts in [30, 10, 20] {
            store.append(TelemetryRecord::new(ts));
        }
        let snap = store.snapshot();
        let order: Vec<i64> = snap.iter().map(|r| r.timestamp).collect();
        assert_eq!(order, vec![30, 10, 20]);
    }

    #[test]
    fn append_returns_new_length() {
        let store = TelemetryStore::new();
        assert_eq!(store.append(TelemetryRecord::new(1)), 1);
        assert_eq!(store.append(TelemetryRecord::new(2)), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let store = TelemetryStore::new();
        store.append(TelemetryRecord::new(1));
        let snap = store.snapshot();
        store.append(TelemetryRecord::new(2));
        assert_eq!(snap.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn concurrent_appends_all_land() {
        let store = Arc::new(TelemetryStore::new());
        std::thread::scope(|s| {
            for t in 0..8 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    for i in 0..250 {
                        store.append(TelemetryRecord::new(t * 1000 + i));
                    }
                });
            }
            // Readers running alongside the writers must always see a
            // consistent prefix.
            let store = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..100 {
                    let snap = store.snapshot();
                    assert_eq!(snap.iter().count(), snap.len());
                }
            });
        });
        assert_eq!(store.len(), 2000);
    }

    #[test]
    fn per_writer_order_survives_interleaving() {
        let store = Arc::new(TelemetryStore::new());
        std::thread::scope(|s| {
            for t in 0..4_i64 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    for i in 0..100 {
                        store.append(TelemetryRecord::new(t * 1000 + i));
                    }
                });
            }
        });
        let snap = store.snapshot();
        for t in 0..4_i64 {
            let mine: Vec<i64> = snap
                .iter()
                .map(|r| r.timestamp)
                .filter(|ts| ts / 1000 == t)
                .collect();
            let expected: Vec<i64> = (0..100).map(|i| t * 1000 + i).collect();
            assert_eq!(mine, expected);
        }
    }

    #[test]
    fn snapshot_serializes_as_array() {
        let snap = Snapshot::from_records([TelemetryRecord::new(5), TelemetryRecord::new(6)]);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[1]["ts"], 6);
    }
}
