//! # Virtual Sensor
//!
//! Produces one sealed `EncryptedMessage` per tick: draw readings, encode
//! canonically, sign if configured, encrypt.

use super::catalogue::generate_reading;
use super::errors::SimulationError;
use rand::Rng;
use shared_crypto::{encrypt, SensorKeyPair, SymmetricKey};
use shared_types::{EncryptedMessage, SensorId, SensorType, TelemetryCodec, TelemetryEnvelope, Timestamp};

#[derive(Clone)]
pub struct VirtualSensor {
    sensor_id: SensorId,
    sensor_type: SensorType,
    key: SymmetricKey,
    signer: Option<SensorKeyPair>,
    codec: TelemetryCodec,
}

impl std::fmt::Debug for VirtualSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualSensor")
            .field("sensor_id", &self.sensor_id)
            .field("sensor_type", &self.sensor_type)
            .field("signed", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl VirtualSensor {
    pub fn new(sensor_id: SensorId, sensor_type: SensorType, key: SymmetricKey) -> Self {
        Self {
            sensor_id,
            sensor_type,
            key,
            signer: None,
            codec: TelemetryCodec::default(),
        }
    }

    /// Sign every message with `signer`.
    #[must_use]
    pub fn with_signer(mut self, signer: SensorKeyPair) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn sensor_id(&self) -> &SensorId {
        &self.sensor_id
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    /// Build the plaintext envelope for time `now`. The protocol nonce comes
    /// from `rng`, so a seeded run is reproducible.
    pub fn next_envelope<R: Rng + ?Sized>(&self, now: Timestamp, rng: &mut R) -> TelemetryEnvelope {
        let payload = generate_reading(self.sensor_type, rng);
        let nonce = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        TelemetryEnvelope::new(self.sensor_id.clone(), self.sensor_type, now, nonce, payload)
    }

    /// Encode, sign and encrypt an envelope.
    pub fn seal(&self, envelope: &TelemetryEnvelope) -> Result<EncryptedMessage, SimulationError> {
        let plaintext = self.codec.encode_envelope(envelope)?;
        let signature = self.signer.as_ref().map(|signer| signer.sign(&plaintext));
        let (aead_nonce, ciphertext) = encrypt(&plaintext, self.key.as_bytes())?;
        Ok(EncryptedMessage {
            sensor_id: self.sensor_id.clone(),
            aead_nonce: *aead_nonce.as_bytes(),
            ciphertext,
            signature,
            sent_at: envelope.timestamp,
        })
    }

    /// One tick: fresh readings, sealed for the gateway.
    pub fn emit<R: Rng + ?Sized>(&self, now: Timestamp, rng: &mut R) -> Result<EncryptedMessage, SimulationError> {
        self.seal(&self.next_envelope(now, rng))
    }
}
