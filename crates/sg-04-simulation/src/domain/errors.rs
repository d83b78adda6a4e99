//! Simulation error types.

use shared_crypto::CryptoError;
use shared_types::{CodecError, SensorId};
use sg_01_authorization::AuthorizationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("Sensor id {0} does not name a known sensor type")]
    UnknownSensorType(SensorId),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Provisioning error: {0}")]
    Authorization(#[from] AuthorizationError),
}
