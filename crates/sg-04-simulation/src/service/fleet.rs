//! # Fleet Provisioning
//!
//! Builds the virtual sensors and the gateway-side `AuthorizationRegistry`
//! from the same key material, so both ends agree on every credential.

use crate::domain::errors::SimulationError;
use crate::domain::sensor::VirtualSensor;
use sg_01_authorization::{AuthorizationRegistry, Credential, SensorIdentity};
use shared_crypto::{derive_shared_key, SensorKeyPair, SymmetricKey};
use shared_types::SensorId;
use tracing::info;

/// Virtual sensors plus the registry that authorizes them.
#[derive(Debug)]
pub struct Fleet {
    pub sensors: Vec<VirtualSensor>,
    pub registry: AuthorizationRegistry,
}

impl Fleet {
    /// Provision each `(id, keypair)` member against the gateway keypair.
    ///
    /// The AEAD key is agreed by ECDH + HKDF on both sides. With
    /// `require_signatures` the sensor also signs every message and the
    /// gateway requires it.
    ///
    /// # Errors
    ///
    /// `UnknownSensorType` for ids without a known type prefix,
    /// `Authorization` for duplicates, `Crypto` if key agreement fails.
    pub fn provision<I>(
        gateway: &SensorKeyPair,
        members: I,
        require_signatures: bool,
    ) -> Result<Self, SimulationError>
    where
        I: IntoIterator<Item = (SensorId, SensorKeyPair)>,
    {
        let gateway_public = gateway.public_key();
        let mut sensors = Vec::new();
        let mut registry = AuthorizationRegistry::new();

        for (sensor_id, keypair) in members {
            let sensor_type = sensor_id
                .sensor_type()
                .ok_or_else(|| SimulationError::UnknownSensorType(sensor_id.clone()))?;
            let sensor_public = keypair.public_key();

            let credential = if require_signatures {
                Credential::from_key_agreement(gateway, &sensor_public)?
            } else {
                Credential::symmetric(derive_shared_key(gateway, &sensor_public)?)
            };
            registry.register(SensorIdentity::new(sensor_id.clone(), sensor_type, credential))?;

            let key = derive_shared_key(&keypair, &gateway_public)?;
            let mut sensor = VirtualSensor::new(sensor_id, sensor_type, key);
            if require_signatures {
                sensor = sensor.with_signer(keypair);
            }
            sensors.push(sensor);
        }

        info!(
            sensors = sensors.len(),
            signed = require_signatures,
            "[sg-04] Fleet provisioned"
        );
        Ok(Self { sensors, registry })
    }

    /// Provision `ids` with freshly generated keypairs.
    pub fn generate(
        gateway: &SensorKeyPair,
        ids: &[SensorId],
        require_signatures: bool,
    ) -> Result<Self, SimulationError> {
        Self::provision(
            gateway,
            ids.iter().map(|id| (id.clone(), SensorKeyPair::generate())),
            require_signatures,
        )
    }

    /// Every sensor uses the same pre-shared AEAD key and no signatures.
    pub fn with_shared_key(ids: &[SensorId], key: &SymmetricKey) -> Result<Self, SimulationError> {
        let mut sensors = Vec::with_capacity(ids.len());
        let mut registry = AuthorizationRegistry::new();
        for sensor_id in ids {
            let sensor_type = sensor_id
                .sensor_type()
                .ok_or_else(|| SimulationError::UnknownSensorType(sensor_id.clone()))?;
            registry.register(SensorIdentity::new(
                sensor_id.clone(),
                sensor_type,
                Credential::symmetric(key.clone()),
            ))?;
            sensors.push(VirtualSensor::new(sensor_id.clone(), sensor_type, key.clone()));
        }
        Ok(Self { sensors, registry })
    }

    pub fn sensor_ids(&self) -> Vec<SensorId> {
        self.sensors.iter().map(|s| s.sensor_id().clone()).collect()
    }
}
