//! `MetricsRecorder` backed by the gateway-telemetry Prometheus registry.

use gateway_telemetry::{
    INGEST_ACCEPTED, INGEST_REJECTED, LAST_SNAPSHOT_CYCLE, LAST_SNAPSHOT_ENTRIES,
    RATE_LIMIT_SIGNALS, SNAPSHOTS_WRITTEN, STORAGE_FAILURES,
};
use sg_03_ingest::{MetricsRecorder, RejectReason};
use shared_types::SensorId;

#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusRecorder;

impl MetricsRecorder for PrometheusRecorder {
    fn record_accepted(&self, _sensor_id: &SensorId) {
        INGEST_ACCEPTED.inc();
    }

    fn record_rejected(&self, reason: RejectReason) {
        INGEST_REJECTED.with_label_values(&[reason.as_str()]).inc();
    }

    fn record_rate_limit_signal(&self, _sensor_id: &SensorId) {
        RATE_LIMIT_SIGNALS.inc();
    }

    fn record_snapshot_written(&self, cycle: u64, entries: usize) {
        SNAPSHOTS_WRITTEN.inc();
        LAST_SNAPSHOT_CYCLE.set(i64::try_from(cycle).unwrap_or(i64::MAX));
        LAST_SNAPSHOT_ENTRIES.set(i64::try_from(entries).unwrap_or(i64::MAX));
    }

    fn record_storage_failure(&self) {
        STORAGE_FAILURES.inc();
    }
}
