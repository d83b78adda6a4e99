//! # Outbound Ports
//!
//! What the simulation engine needs from the gateway it drives.

use sg_03_ingest::{FlushReport, IngestResult, StorageError};
use shared_types::{EncryptedMessage, Timestamp};
use std::sync::Arc;

/// A gateway that can receive sealed messages and flush its store.
///
/// Production: `LocalGateway` (in-process sg-03 pipeline).
pub trait TelemetryGateway: Send + Sync {
    /// Hand one message to the gateway at gateway time `now`.
    fn deliver(&self, message: &EncryptedMessage, now: Timestamp) -> IngestResult;

    /// Snapshot and clear the latest-readings store.
    fn flush(&self, now: Timestamp) -> Result<FlushReport, StorageError>;
}

impl<T: TelemetryGateway + ?Sized> TelemetryGateway for Arc<T> {
    fn deliver(&self, message: &EncryptedMessage, now: Timestamp) -> IngestResult {
        (**self).deliver(message, now)
    }

    fn flush(&self, now: Timestamp) -> Result<FlushReport, StorageError> {
        (**self).flush(now)
    }
}
