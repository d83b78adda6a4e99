//! # Latest Readings Store
//!
//! sensor_id -> last accepted envelope, swapped out wholesale on each flush.
//!
//! Writers and the flush swap share one `RwLock`. A write that races a flush
//! lands either before the swap (and is in this snapshot) or after it (and is
//! in the next one).

use parking_lot::RwLock;
use shared_types::{SensorId, TelemetryEnvelope};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct LatestReadingsStore {
    latest: RwLock<HashMap<SensorId, TelemetryEnvelope>>,
}

impl LatestReadingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sensor's entry (last write wins).
    pub fn upsert(&self, envelope: TelemetryEnvelope) {
        self.latest
            .write()
            .insert(envelope.sensor_id.clone(), envelope);
    }

    pub fn get(&self, sensor_id: &SensorId) -> Option<TelemetryEnvelope> {
        self.latest.read().get(sensor_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.latest.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.read().is_empty()
    }

    /// Atomically take every entry, leaving the store empty.
    pub fn take_all(&self) -> HashMap<SensorId, TelemetryEnvelope> {
        std::mem::take(&mut *self.latest.write())
    }

    /// Put back entries taken by a failed flush. Readings that arrived after
    /// the take are newer and are kept.
    pub fn restore(&self, entries: HashMap<SensorId, TelemetryEnvelope>) {
        let mut latest = self.latest.write();
        for (sensor_id, envelope) in entries {
            latest.entry(sensor_id).or_insert(envelope);
        }
    }

    /// Sorted ids currently held.
    pub fn sensor_ids(&self) -> Vec<SensorId> {
        let mut ids: Vec<_> = self.latest.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared_types::{Readings, SensorType};
    use uuid::Uuid;

    fn envelope(id: &str, second: u32) -> TelemetryEnvelope {
        TelemetryEnvelope::new(
            SensorId::new(id),
            SensorType::Soil,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, second).unwrap(),
            Uuid::new_v4(),
            Readings::new(),
        )
    }

    #[test]
    fn test_last_write_wins() {
        let store = LatestReadingsStore::new();
        store.upsert(envelope("soil_01", 1));
        store.upsert(envelope("soil_01", 2));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&SensorId::new("soil_01")).unwrap().timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 2).unwrap()
        );
    }

    #[test]
    fn test_take_all_clears() {
        let store = LatestReadingsStore::new();
        store.upsert(envelope("soil_01", 1));
        store.upsert(envelope("soil_02", 1));
        let taken = store.take_all();
        assert_eq!(taken.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_keeps_newer_entries() {
        let store = LatestReadingsStore::new();
        store.upsert(envelope("soil_01", 1));
        store.upsert(envelope("soil_02", 1));
        let taken = store.take_all();

        store.upsert(envelope("soil_01", 9));
        store.restore(taken);

        assert_eq!(store.sensor_ids().len(), 2);
        assert_eq!(
            store.get(&SensorId::new("soil_01")).unwrap().timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 9).unwrap()
        );
    }
}
