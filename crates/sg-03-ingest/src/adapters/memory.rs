//! In-memory sinks for unit and integration tests.

use crate::domain::errors::StorageError;
use crate::ports::outbound::{SnapshotSink, TelemetryLog};
use parking_lot::Mutex;
use shared_types::{LogRecord, Snapshot};
use std::sync::atomic::{AtomicBool, Ordering};

/// Telemetry log kept in a `Vec`. Can be switched to failing mode.
#[derive(Debug, Default)]
pub struct InMemoryTelemetryLog {
    records: Mutex<Vec<LogRecord>>,
    failing: AtomicBool,
}

impl InMemoryTelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl TelemetryLog for InMemoryTelemetryLog {
    fn append(&self, record: &LogRecord) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("log disk full".into()));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Snapshot sink kept in a `Vec`. Can be switched to failing mode.
#[derive(Debug, Default)]
pub struct InMemorySnapshotSink {
    snapshots: Mutex<Vec<Snapshot>>,
    failing: AtomicBool,
}

impl InMemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SnapshotSink for InMemorySnapshotSink {
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<String, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("snapshot volume offline".into()));
        }
        self.snapshots.lock().push(snapshot.clone());
        Ok(format!("memory://cycle/{}", snapshot.cycle))
    }

    fn last_cycle(&self) -> Result<u64, StorageError> {
        Ok(self.snapshots.lock().iter().map(|s| s.cycle).max().unwrap_or(0))
    }
}
