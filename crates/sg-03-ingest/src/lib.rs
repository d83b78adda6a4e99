//! # Gateway Ingest Subsystem (SG-03)
//!
//! Turns encrypted sensor messages into accepted readings and periodic
//! snapshots.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): ingest outcomes, the latest-readings store,
//!   storage errors
//! - **Ports Layer** (`ports/`): `IngestApi` inbound; authorizer, telemetry
//!   log, snapshot sink, clock and operator alert outbound
//! - **Adapters** (`adapters/`): JSON Lines log, snapshot files, clocks,
//!   alerting, in-memory test doubles
//! - **Service Layer** (`service/`): `GatewayIngestPipeline` and
//!   `FlushCoordinator`
//!
//! ## Validation Order
//!
//! ```text
//! Received ─→ authorization ─→ AEAD decrypt + decode ─→ signature (if required)
//!          ─→ rate signal ─→ replay/freshness ─→ store + log ─→ Accepted
//! ```
//!
//! Every check runs on authenticated data only. The outer `sent_at` of an
//! encrypted message is logged and otherwise ignored.

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::alert::{AlertRecord, RecordingAlert, TracingAlert};
pub use adapters::clock::{SimulatedClock, SystemClock};
pub use adapters::jsonl_log::JsonlTelemetryLog;
pub use adapters::memory::{InMemorySnapshotSink, InMemoryTelemetryLog};
pub use adapters::snapshot_file::{parse_snapshot_file_name, snapshot_file_name, FileSnapshotSink};
pub use domain::errors::StorageError;
pub use domain::result::{IngestResult, IngestStage, RejectReason, Rejection, StatusClass};
pub use domain::store::LatestReadingsStore;
pub use metrics::{IngestMetrics, IngestMetricsSnapshot, MetricsRecorder, NoOpMetrics};
pub use ports::inbound::IngestApi;
pub use ports::outbound::{AlertKind, Clock, OperatorAlert, SensorAuthorizer, SnapshotSink, TelemetryLog};
pub use service::flush::{FlushCoordinator, FlushReport};
pub use service::pipeline::{GatewayIngestPipeline, IngestConfig};
