//! # Shared Types Crate
//!
//! Domain entities and message types shared by every gateway subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: sensor identifiers, telemetry envelopes and
//!   wire messages are defined once, here.
//! - **Two Nonces**: the protocol nonce (`TelemetryEnvelope::nonce`, a UUID)
//!   lives inside the authenticated payload and drives replay protection. The
//!   AEAD nonce (`EncryptedMessage::aead_nonce`, 12 bytes) only has to be
//!   unique per key. They are different types so they cannot be confused.
//! - **Canonical Form**: `TelemetryCodec` produces the exact bytes that are
//!   encrypted and signed. The detached signature is never part of them.

pub mod codec;
pub mod entities;
pub mod envelope;
pub mod errors;

pub use codec::{TelemetryCodec, WireEncoding};
pub use entities::{ReadingValue, Readings, SensorId, SensorType, Timestamp};
pub use envelope::{
    EncryptedMessage, LogRecord, Snapshot, SnapshotEntry, TelemetryEnvelope, WireEnvelope,
    AEAD_NONCE_LEN,
};
pub use errors::CodecError;
