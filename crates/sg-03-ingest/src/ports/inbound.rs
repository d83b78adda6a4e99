//! # Inbound Ports (Driving Ports / API)

use crate::domain::result::IngestResult;
use shared_types::{EncryptedMessage, Timestamp, WireEnvelope};

/// Primary ingest API.
///
/// Implementations must be thread-safe: the live gateway calls `receive`
/// from many tasks at once.
pub trait IngestApi: Send + Sync {
    /// Validate one encrypted message received at `now`.
    fn receive(&self, message: &EncryptedMessage, now: Timestamp) -> IngestResult;

    /// Decode a wire envelope and validate it. Undecodable fields are a
    /// `MalformedEnvelope` rejection.
    fn receive_wire(&self, wire: &WireEnvelope, now: Timestamp) -> IngestResult;
}
