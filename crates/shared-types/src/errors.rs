//! # Error Types
//!
//! Errors raised while converting between envelopes and their byte or wire
//! representations.

use thiserror::Error;

/// Failure to encode or decode a telemetry message.
///
/// Every variant maps to a `MalformedEnvelope` rejection at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The canonical JSON could not be parsed into an envelope.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A binary field was not valid hex/base64.
    #[error("Invalid {field} encoding: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    /// A binary field decoded to the wrong number of bytes.
    #[error("Invalid {field} length: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The wire timestamp is not ISO-8601.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization failed (should not happen for well-formed values).
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
