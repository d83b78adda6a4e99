//! # Telemetry Codec
//!
//! Canonical (de)serialization of `TelemetryEnvelope` and the text encoding
//! of `EncryptedMessage` on the wire.
//!
//! The canonical form is compact JSON. Readings are held in a `BTreeMap` and
//! struct fields serialize in declaration order, so the same envelope always
//! yields the same bytes. Those bytes are what gets encrypted and signed.

use crate::entities::Timestamp;
use crate::envelope::{EncryptedMessage, TelemetryEnvelope, WireEnvelope, AEAD_NONCE_LEN};
use crate::errors::CodecError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Text encoding for binary wire fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireEncoding {
    /// Lowercase hexadecimal.
    #[default]
    Hex,
    /// Standard base64 with padding.
    Base64,
}

/// Stateless codec parameterised by the wire encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryCodec {
    encoding: WireEncoding,
}

impl TelemetryCodec {
    /// Create a codec using the given wire encoding.
    pub fn new(encoding: WireEncoding) -> Self {
        Self { encoding }
    }

    /// Wire encoding in use.
    pub fn encoding(&self) -> WireEncoding {
        self.encoding
    }

    /// Canonical bytes of an envelope (signature excluded).
    pub fn encode_envelope(&self, envelope: &TelemetryEnvelope) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(envelope).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Parse canonical bytes back into an envelope.
    pub fn decode_envelope(&self, bytes: &[u8]) -> Result<TelemetryEnvelope, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::MalformedEnvelope(e.to_string()))
    }

    /// Convert an encrypted message into its text wire form.
    pub fn to_wire(&self, message: &EncryptedMessage) -> WireEnvelope {
        WireEnvelope {
            sensor_id: message.sensor_id.to_string(),
            nonce: self.encode_bytes(&message.aead_nonce),
            encrypted_data: self.encode_bytes(&message.ciphertext),
            signature: message.signature.as_deref().map(hex::encode),
            timestamp: message.sent_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Parse a wire envelope.
    ///
    /// # Errors
    ///
    /// Any undecodable field yields a `CodecError`; the gateway maps all of
    /// them to `MalformedEnvelope`.
    pub fn from_wire(&self, wire: &WireEnvelope) -> Result<EncryptedMessage, CodecError> {
        let nonce_bytes = self.decode_bytes("nonce", &wire.nonce)?;
        let aead_nonce: [u8; AEAD_NONCE_LEN] =
            nonce_bytes
                .as_slice()
                .try_into()
                .map_err(|_| CodecError::InvalidLength {
                    field: "nonce",
                    expected: AEAD_NONCE_LEN,
                    actual: nonce_bytes.len(),
                })?;

        let ciphertext = self.decode_bytes("encrypted_data", &wire.encrypted_data)?;

        // Signatures are always hex on the wire.
        let signature = wire
            .signature
            .as_deref()
            .map(|s| {
                hex::decode(s).map_err(|e| CodecError::InvalidEncoding {
                    field: "signature",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(EncryptedMessage {
            sensor_id: wire.sensor_id.as_str().into(),
            aead_nonce,
            ciphertext,
            signature,
            sent_at: parse_timestamp(&wire.timestamp)?,
        })
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        match self.encoding {
            WireEncoding::Hex => hex::encode(bytes),
            WireEncoding::Base64 => BASE64.encode(bytes),
        }
    }

    fn decode_bytes(&self, field: &'static str, text: &str) -> Result<Vec<u8>, CodecError> {
        let decoded = match self.encoding {
            WireEncoding::Hex => hex::decode(text).map_err(|e| e.to_string()),
            WireEncoding::Base64 => BASE64.decode(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|reason| CodecError::InvalidEncoding { field, reason })
    }
}

/// Parse an ISO-8601 timestamp. Offsets are normalised to UTC; a timestamp
/// without an offset is taken to be UTC already.
pub fn parse_timestamp(text: &str) -> Result<Timestamp, CodecError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| CodecError::InvalidTimestamp(format!("{text}: {e}")))
}
