//! Prometheus metrics for the gateway.
//!
//! All metrics follow the naming convention: `sg_<area>_<metric>_<unit>`
//!
//! Counters only move forward; gauges describe the most recent flush.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Gateway metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INGEST METRICS (SG-03)
    // =========================================================================

    /// Messages accepted into the store
    pub static ref INGEST_ACCEPTED: IntCounter = IntCounter::new(
        "sg_ingest_accepted_total",
        "Total telemetry messages accepted"
    ).expect("metric creation failed");

    /// Messages rejected, by reason
    pub static ref INGEST_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("sg_ingest_rejected_total", "Total telemetry messages rejected"),
        &["reason"]  // unauthorized/authentication_failure/replay/stale/...
    ).expect("metric creation failed");

    /// Messages over a sensor's request rate (blocked or not)
    pub static ref RATE_LIMIT_SIGNALS: IntCounter = IntCounter::new(
        "sg_rate_limit_signals_total",
        "Messages that exceeded their sensor's request rate"
    ).expect("metric creation failed");

    // =========================================================================
    // FLUSH / STORAGE METRICS (SG-03)
    // =========================================================================

    /// Snapshots written
    pub static ref SNAPSHOTS_WRITTEN: IntCounter = IntCounter::new(
        "sg_snapshots_written_total",
        "Total snapshot artifacts written"
    ).expect("metric creation failed");

    /// Cycle number of the last snapshot written
    pub static ref LAST_SNAPSHOT_CYCLE: IntGauge = IntGauge::new(
        "sg_snapshot_last_cycle",
        "Cycle number of the most recent snapshot"
    ).expect("metric creation failed");

    /// Sensors captured by the last snapshot
    pub static ref LAST_SNAPSHOT_ENTRIES: IntGauge = IntGauge::new(
        "sg_snapshot_last_entries",
        "Number of sensors in the most recent snapshot"
    ).expect("metric creation failed");

    /// Log appends and snapshot writes that failed
    pub static ref STORAGE_FAILURES: IntCounter = IntCounter::new(
        "sg_storage_failures_total",
        "Total failed telemetry log appends and snapshot writes"
    ).expect("metric creation failed");
}

/// Register all metrics with the gateway registry. Safe to call repeatedly.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Ingest
        Box::new(INGEST_ACCEPTED.clone()),
        Box::new(INGEST_REJECTED.clone()),
        Box::new(RATE_LIMIT_SIGNALS.clone()),
        // Flush / storage
        Box::new(SNAPSHOTS_WRITTEN.clone()),
        Box::new(LAST_SNAPSHOT_CYCLE.clone()),
        Box::new(LAST_SNAPSHOT_ENTRIES.clone()),
        Box::new(STORAGE_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
