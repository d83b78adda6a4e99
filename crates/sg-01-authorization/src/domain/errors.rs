//! # Authorization Errors

use shared_types::{SensorId, SensorType};
use thiserror::Error;

/// Errors raised while provisioning or querying the registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No credential is registered for the sensor.
    #[error("No credential registered for sensor {0}")]
    NotFound(SensorId),

    /// The sensor id is already registered.
    #[error("Sensor {0} is already registered")]
    DuplicateSensor(SensorId),

    /// The id prefix does not match the declared sensor type.
    #[error("Sensor {sensor_id} declared as {declared} but its id says otherwise")]
    TypeMismatch {
        sensor_id: SensorId,
        declared: SensorType,
    },

    /// The id prefix does not name any known sensor type.
    #[error("Sensor {0} has an unknown type prefix")]
    UnknownType(SensorId),
}
