//! # Telemetry Envelopes
//!
//! The plaintext `TelemetryEnvelope` a sensor produces each tick, the
//! `EncryptedMessage` that carries it to the gateway, and the records the
//! gateway persists once a message is accepted.
//!
//! ## Security Properties
//!
//! - **Authenticated Identity**: `TelemetryEnvelope::sensor_id` is inside the
//!   ciphertext; `EncryptedMessage::sensor_id` only selects the key.
//! - **Time-Bounded Replay Prevention**: `timestamp` and `nonce` are checked
//!   after decryption, never before.
//! - **Unauthenticated Outer Timestamp**: `EncryptedMessage::sent_at` is
//!   informational and must not influence any decision.

use crate::entities::{Readings, SensorId, SensorType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Length of the AES-GCM nonce in bytes.
pub const AEAD_NONCE_LEN: usize = 12;

/// One sensor reading cycle, as produced by the sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEnvelope {
    /// Sensor that produced the readings.
    pub sensor_id: SensorId,

    /// Declared sensor type.
    #[serde(rename = "type")]
    pub sensor_type: SensorType,

    /// Creation time declared by the sensor.
    pub timestamp: Timestamp,

    /// Protocol nonce, unique per message, used for replay protection.
    pub nonce: Uuid,

    /// Field -> value readings.
    #[serde(rename = "data")]
    pub payload: Readings,

    /// Detached ECDSA signature over the canonical bytes of this envelope.
    /// Never serialized as part of the envelope itself.
    #[serde(skip)]
    pub signature: Option<Vec<u8>>,
}

impl TelemetryEnvelope {
    /// Create an unsigned envelope.
    pub fn new(
        sensor_id: SensorId,
        sensor_type: SensorType,
        timestamp: Timestamp,
        nonce: Uuid,
        payload: Readings,
    ) -> Self {
        Self {
            sensor_id,
            sensor_type,
            timestamp,
            nonce,
            payload,
            signature: None,
        }
    }

    /// Attach a detached signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Option<Vec<u8>>) -> Self {
        self.signature = signature;
        self
    }
}

/// An envelope after encryption: what actually travels to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// Routing identity, used to select the decryption key.
    pub sensor_id: SensorId,

    /// AES-GCM nonce. Independent of the protocol nonce.
    pub aead_nonce: [u8; AEAD_NONCE_LEN],

    /// Ciphertext with the 16-byte authentication tag appended.
    pub ciphertext: Vec<u8>,

    /// Detached signature over the plaintext, for sensors with asymmetric
    /// spoofing protection.
    pub signature: Option<Vec<u8>>,

    /// Unauthenticated send time from the outer wire envelope.
    pub sent_at: Timestamp,
}

/// Text form of an `EncryptedMessage` as exchanged with the request-handling
/// collaborator. Byte fields are hex or base64 depending on the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
    pub sensor_id: String,
    pub nonce: String,
    pub encrypted_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// ISO-8601 / RFC 3339 UTC timestamp.
    pub timestamp: String,
}

/// One line of the append-only telemetry log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: Timestamp,
    pub sensor_id: SensorId,
    pub data: Readings,
}

impl From<&TelemetryEnvelope> for LogRecord {
    fn from(envelope: &TelemetryEnvelope) -> Self {
        Self {
            timestamp: envelope.timestamp,
            sensor_id: envelope.sensor_id.clone(),
            data: envelope.payload.clone(),
        }
    }
}

/// Latest accepted reading of one sensor, as written into a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub sensor_id: SensorId,
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub data: Readings,
}

impl From<TelemetryEnvelope> for SnapshotEntry {
    fn from(envelope: TelemetryEnvelope) -> Self {
        Self {
            sensor_id: envelope.sensor_id,
            timestamp: envelope.timestamp,
            sensor_type: envelope.sensor_type,
            data: envelope.payload,
        }
    }
}

/// Aggregated state of one flush cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonically increasing cycle number, starting at 1.
    pub cycle: u64,
    /// Gateway time at which the store was swapped out.
    pub taken_at: Timestamp,
    /// sensor_id -> last accepted record.
    pub entries: BTreeMap<SensorId, SnapshotEntry>,
}

impl Snapshot {
    /// Number of sensors captured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no sensor reported during the cycle.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
