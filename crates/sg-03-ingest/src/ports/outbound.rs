//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the ingest service requires the host to provide.

use crate::domain::errors::StorageError;
use sg_01_authorization::{AuthorizationRegistry, Credential};
use shared_types::{LogRecord, SensorId, Snapshot, Timestamp};
use std::sync::Arc;

/// Allow-list and credential lookup.
///
/// Production: `AuthorizationRegistry` (sg-01).
pub trait SensorAuthorizer: Send + Sync {
    fn is_authorized(&self, sensor_id: &SensorId) -> bool;

    /// Credential of an authorized sensor, if it has one.
    fn credential(&self, sensor_id: &SensorId) -> Option<&Credential>;
}

impl SensorAuthorizer for AuthorizationRegistry {
    fn is_authorized(&self, sensor_id: &SensorId) -> bool {
        AuthorizationRegistry::is_authorized(self, sensor_id)
    }

    fn credential(&self, sensor_id: &SensorId) -> Option<&Credential> {
        self.lookup_credential(sensor_id).ok()
    }
}

impl<T: SensorAuthorizer + ?Sized> SensorAuthorizer for Arc<T> {
    fn is_authorized(&self, sensor_id: &SensorId) -> bool {
        (**self).is_authorized(sensor_id)
    }

    fn credential(&self, sensor_id: &SensorId) -> Option<&Credential> {
        (**self).credential(sensor_id)
    }
}

/// Append-only telemetry log. Records are never rewritten.
///
/// Production: `JsonlTelemetryLog`. Testing: `InMemoryTelemetryLog`.
pub trait TelemetryLog: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<(), StorageError>;
}

impl<T: TelemetryLog + ?Sized> TelemetryLog for Arc<T> {
    fn append(&self, record: &LogRecord) -> Result<(), StorageError> {
        (**self).append(record)
    }
}

/// Durable destination for flush snapshots.
///
/// Production: `FileSnapshotSink`. Testing: `InMemorySnapshotSink`.
pub trait SnapshotSink: Send + Sync {
    /// Persist one snapshot; returns a description of where it went.
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<String, StorageError>;

    /// Highest cycle already persisted, 0 if none.
    fn last_cycle(&self) -> Result<u64, StorageError> {
        Ok(0)
    }
}

impl<T: SnapshotSink + ?Sized> SnapshotSink for Arc<T> {
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<String, StorageError> {
        (**self).write_snapshot(snapshot)
    }

    fn last_cycle(&self) -> Result<u64, StorageError> {
        (**self).last_cycle()
    }
}

/// Time source (for testability and simulated time).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Kind of condition an operator must look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// A message was accepted but its log record could not be appended.
    LogAppendFailed,
    /// A snapshot could not be written; its entries were put back.
    SnapshotWriteFailed,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LogAppendFailed => "log_append_failed",
            AlertKind::SnapshotWriteFailed => "snapshot_write_failed",
        }
    }
}

/// Operator alerting channel.
pub trait OperatorAlert: Send + Sync {
    fn raise(&self, kind: AlertKind, detail: &str);
}
