//! # Periodic Flush
//!
//! Swaps the latest-readings store out, writes it as a cycle-numbered
//! snapshot and leaves the store empty for the next cycle.
//!
//! Flushes are serialized by a mutex held across swap and write. The cycle
//! counter only advances when the write succeeds; on failure the taken
//! entries go back into the store and an operator alert is raised.
//!
//! Numbering continues from the highest cycle the sink already holds, so a
//! restarted gateway never overwrites an earlier run's snapshots.

use crate::adapters::alert::TracingAlert;
use crate::domain::errors::StorageError;
use crate::domain::store::LatestReadingsStore;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::outbound::{AlertKind, OperatorAlert, SnapshotSink};
use parking_lot::Mutex;
use shared_types::{Snapshot, SnapshotEntry, Timestamp};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one successful flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub cycle: u64,
    pub entries: usize,
    pub location: String,
}

pub struct FlushCoordinator<S: SnapshotSink> {
    store: Arc<LatestReadingsStore>,
    sink: S,
    alert: Arc<dyn OperatorAlert>,
    metrics: Arc<dyn MetricsRecorder>,
    /// Completed cycles; also the flush mutex.
    completed: Mutex<u64>,
}

impl<S: SnapshotSink> FlushCoordinator<S> {
    /// Coordinator numbering on from the sink's last cycle. A sink that
    /// cannot report one is treated as empty.
    pub fn new(store: Arc<LatestReadingsStore>, sink: S) -> Self {
        let completed = match sink.last_cycle() {
            Ok(cycle) => cycle,
            Err(e) => {
                warn!(error = %e, "[sg-03] Could not read existing snapshots; numbering from 1");
                0
            }
        };
        Self::starting_after(store, sink, completed)
    }

    /// Like `new`, but fails if the sink's last cycle cannot be read.
    ///
    /// # Errors
    ///
    /// The sink's `StorageError` from `last_cycle`.
    pub fn resume(store: Arc<LatestReadingsStore>, sink: S) -> Result<Self, StorageError> {
        let completed = sink.last_cycle()?;
        if completed > 0 {
            info!(last_cycle = completed, "[sg-03] Continuing snapshot numbering");
        }
        Ok(Self::starting_after(store, sink, completed))
    }

    fn starting_after(store: Arc<LatestReadingsStore>, sink: S, completed: u64) -> Self {
        Self {
            store,
            sink,
            alert: Arc::new(TracingAlert),
            metrics: Arc::new(NoOpMetrics),
            completed: Mutex::new(completed),
        }
    }

    #[must_use]
    pub fn with_alert(mut self, alert: Arc<dyn OperatorAlert>) -> Self {
        self.alert = alert;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Highest cycle written, by this coordinator or before it.
    pub fn cycles_completed(&self) -> u64 {
        *self.completed.lock()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Snapshot and clear the store.
    ///
    /// # Errors
    ///
    /// Returns the sink's `StorageError`. The store then holds the taken
    /// entries again (merged with anything newer) and the cycle number is
    /// reused by the next attempt.
    pub fn flush(&self, now: Timestamp) -> Result<FlushReport, StorageError> {
        let mut completed = self.completed.lock();
        let cycle = *completed + 1;

        let taken = self.store.take_all();
        let snapshot = Snapshot {
            cycle,
            taken_at: now,
            entries: taken
                .iter()
                .map(|(id, envelope)| (id.clone(), SnapshotEntry::from(envelope.clone())))
                .collect(),
        };

        match self.sink.write_snapshot(&snapshot) {
            Ok(location) => {
                *completed = cycle;
                self.metrics.record_snapshot_written(cycle, snapshot.len());
                info!(cycle, entries = snapshot.len(), %location, "[sg-03] Snapshot written");
                Ok(FlushReport {
                    cycle,
                    entries: snapshot.len(),
                    location,
                })
            }
            Err(e) => {
                let entries = taken.len();
                self.store.restore(taken);
                self.metrics.record_storage_failure();
                self.alert.raise(
                    AlertKind::SnapshotWriteFailed,
                    &format!("snapshot cycle {cycle} failed ({entries} entries restored): {e}"),
                );
                Err(e)
            }
        }
    }
}
