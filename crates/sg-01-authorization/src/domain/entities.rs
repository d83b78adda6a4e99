//! # Authorization Entities
//!
//! `SensorIdentity` and the `Credential` it carries.

use shared_crypto::{derive_shared_key, CryptoError, SensorKeyPair, SensorPublicKey, SymmetricKey};
use shared_types::{SensorId, SensorType};

/// Sensors of each type in the default deployment (`<type>_01` .. `<type>_05`).
pub const SENSORS_PER_TYPE: u32 = 5;

/// Key material the gateway holds for one sensor.
///
/// A credential with a verifying key marks the sensor as configured with
/// asymmetric spoofing protection: every message from it must carry a valid
/// detached signature.
#[derive(Debug, Clone)]
pub struct Credential {
    symmetric_key: SymmetricKey,
    verifying_key: Option<SensorPublicKey>,
}

impl Credential {
    /// Credential with only a symmetric AEAD key.
    pub fn symmetric(symmetric_key: SymmetricKey) -> Self {
        Self {
            symmetric_key,
            verifying_key: None,
        }
    }

    /// Require signatures verifiable with `verifying_key`.
    #[must_use]
    pub fn with_verifying_key(mut self, verifying_key: SensorPublicKey) -> Self {
        self.verifying_key = Some(verifying_key);
        self
    }

    /// Credential whose AEAD key is agreed by ECDH between the gateway keypair
    /// and the sensor public key. The sensor key also becomes the verifying key.
    pub fn from_key_agreement(
        gateway: &SensorKeyPair,
        sensor_public: &SensorPublicKey,
    ) -> Result<Self, CryptoError> {
        let symmetric_key = derive_shared_key(gateway, sensor_public)?;
        Ok(Self::symmetric(symmetric_key).with_verifying_key(sensor_public.clone()))
    }

    pub fn symmetric_key(&self) -> &SymmetricKey {
        &self.symmetric_key
    }

    pub fn verifying_key(&self) -> Option<&SensorPublicKey> {
        self.verifying_key.as_ref()
    }

    /// True if messages must carry a detached signature.
    pub fn requires_signature(&self) -> bool {
        self.verifying_key.is_some()
    }
}

/// A provisioned sensor. Immutable once created.
#[derive(Debug, Clone)]
pub struct SensorIdentity {
    pub sensor_id: SensorId,
    pub sensor_type: SensorType,
    pub credential: Credential,
}

impl SensorIdentity {
    pub fn new(sensor_id: SensorId, sensor_type: SensorType, credential: Credential) -> Self {
        Self {
            sensor_id,
            sensor_type,
            credential,
        }
    }
}

/// Ids of the default deployment, in catalogue order.
pub fn default_fleet() -> Vec<SensorId> {
    SensorType::ALL
        .into_iter()
        .flat_map(|t| (1..=SENSORS_PER_TYPE).map(move |i| SensorId::for_type(t, i)))
        .collect()
}
