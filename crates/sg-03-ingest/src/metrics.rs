//! Metrics hooks for the ingest pipeline and flush.
//!
//! `MetricsRecorder` is the seam; `IngestMetrics` is a lock-free in-process
//! implementation, and the runtime bridges the same calls to Prometheus.

use crate::domain::result::RejectReason;
use shared_types::SensorId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Instrumentation points called by the pipeline and the flush coordinator.
pub trait MetricsRecorder: Send + Sync {
    fn record_accepted(&self, sensor_id: &SensorId);
    fn record_rejected(&self, reason: RejectReason);
    fn record_rate_limit_signal(&self, sensor_id: &SensorId);
    fn record_snapshot_written(&self, cycle: u64, entries: usize);
    fn record_storage_failure(&self);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_accepted(&self, _sensor_id: &SensorId) {}
    fn record_rejected(&self, _reason: RejectReason) {}
    fn record_rate_limit_signal(&self, _sensor_id: &SensorId) {}
    fn record_snapshot_written(&self, _cycle: u64, _entries: usize) {}
    fn record_storage_failure(&self) {}
}

/// Atomic counters.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    accepted: AtomicU64,
    rejected: [AtomicU64; 7],
    rate_limit_signals: AtomicU64,
    snapshots_written: AtomicU64,
    snapshot_entries: AtomicU64,
    storage_failures: AtomicU64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter values.
    pub fn snapshot(&self) -> IngestMetricsSnapshot {
        let rejected = RejectReason::ALL
            .iter()
            .map(|reason| (*reason, self.rejected[reason.index()].load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        IngestMetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected,
            rate_limit_signals: self.rate_limit_signals.load(Ordering::Relaxed),
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
            snapshot_entries: self.snapshot_entries.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

impl MetricsRecorder for IngestMetrics {
    fn record_accepted(&self, _sensor_id: &SensorId) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_rejected(&self, reason: RejectReason) {
        self.rejected[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn record_rate_limit_signal(&self, _sensor_id: &SensorId) {
        self.rate_limit_signals.fetch_add(1, Ordering::Relaxed);
    }

    fn record_snapshot_written(&self, _cycle: u64, entries: usize) {
        self.snapshots_written.fetch_add(1, Ordering::Relaxed);
        self.snapshot_entries.fetch_add(entries as u64, Ordering::Relaxed);
    }

    fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of `IngestMetrics`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestMetricsSnapshot {
    pub accepted: u64,
    /// Non-zero rejection counts, in taxonomy order.
    pub rejected: Vec<(RejectReason, u64)>,
    pub rate_limit_signals: u64,
    pub snapshots_written: u64,
    pub snapshot_entries: u64,
    pub storage_failures: u64,
}

impl IngestMetricsSnapshot {
    pub fn rejected_total(&self) -> u64 {
        self.rejected.iter().map(|(_, count)| count).sum()
    }

    pub fn rejected_for(&self, reason: RejectReason) -> u64 {
        self.rejected
            .iter()
            .find(|(r, _)| *r == reason)
            .map_or(0, |(_, count)| *count)
    }
}
