//! # Core Domain Entities
//!
//! Sensor identifiers, sensor types and reading values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// UTC timestamp carried by envelopes, log records and snapshots.
pub type Timestamp = DateTime<Utc>;

/// Field name -> value mapping produced by one sensor tick.
///
/// A `BTreeMap` keeps the canonical serialization independent of insertion
/// order.
pub type Readings = BTreeMap<String, ReadingValue>;

/// Separator between the type prefix and the index in a sensor id.
pub const SENSOR_ID_SEPARATOR: char = '_';

/// The kinds of sensor deployed in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    /// Soil moisture, temperature and nutrient probes.
    Soil,
    /// Weather station.
    Atmospheric,
    /// Leaf and stem instrumentation.
    Plant,
    /// Intrusion and radio-environment monitor.
    Threat,
    /// Irrigation and water-quality probe.
    Water,
}

impl SensorType {
    /// All sensor types, in catalogue order.
    pub const ALL: [SensorType; 5] = [
        SensorType::Soil,
        SensorType::Atmospheric,
        SensorType::Plant,
        SensorType::Threat,
        SensorType::Water,
    ];

    /// Lowercase name, identical to the id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Soil => "soil",
            SensorType::Atmospheric => "atmospheric",
            SensorType::Plant => "plant",
            SensorType::Threat => "threat",
            SensorType::Water => "water",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = UnknownSensorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSensorType(s.to_string()))
    }
}

/// Returned when a string does not name a known sensor type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sensor type: {0}")]
pub struct UnknownSensorType(pub String);

/// Sensor identifier, canonically `<type>_<NN>` (e.g. `soil_01`).
///
/// Any string is accepted as an id value: ids arrive from the network and
/// must be representable before they can be rejected. Whether the prefix
/// names a known type is answered by [`SensorId::sensor_type`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Canonical id for the `index`-th sensor of a type (`soil_01`).
    pub fn for_type(sensor_type: SensorType, index: u32) -> Self {
        Self(format!("{}{}{:02}", sensor_type, SENSOR_ID_SEPARATOR, index))
    }

    /// Text before the first separator (the whole id if there is none).
    pub fn type_prefix(&self) -> &str {
        self.0
            .split_once(SENSOR_ID_SEPARATOR)
            .map_or(self.0.as_str(), |(prefix, _)| prefix)
    }

    /// Sensor type derived from the prefix, if it names a known type.
    pub fn sensor_type(&self) -> Option<SensorType> {
        self.type_prefix().parse().ok()
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SensorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single reading.
///
/// Boolean-style flags are 0/1 integers; physical quantities are floats.
/// Serialized untagged so both appear as plain JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Bernoulli flag, 0 or 1.
    Flag(u8),
    /// Continuous measurement.
    Measure(f64),
}

impl ReadingValue {
    /// Numeric view of the value.
    pub fn as_f64(&self) -> f64 {
        match self {
            ReadingValue::Flag(v) => f64::from(*v),
            ReadingValue::Measure(v) => *v,
        }
    }
}
