//! # Sensor Catalogue
//!
//! The five readings each sensor type reports and how they are drawn.
//! Physical quantities are uniform over a fixed range and rounded; flags are
//! fair coin flips reported as 0/1.

use rand::Rng;
use shared_types::{ReadingValue, Readings, SensorType};

/// How one field is generated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Uniform over `[min, max]`, rounded to `decimals` places.
    Uniform { min: f64, max: f64, decimals: i32 },
    /// Bernoulli(0.5), reported as 0 or 1.
    Flag,
}

/// One catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn uniform(name: &'static str, min: f64, max: f64, decimals: i32) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Uniform { min, max, decimals },
    }
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Flag,
    }
}

const SOIL: [FieldSpec; 5] = [
    uniform("moisture", 10.0, 80.0, 2),
    uniform("temperature", 10.0, 35.0, 1),
    uniform("pH", 5.5, 8.5, 2),
    uniform("nitrogen", 1.0, 100.0, 2),
    uniform("phosphorus", 1.0, 100.0, 2),
];

const ATMOSPHERIC: [FieldSpec; 5] = [
    uniform("air_temp", 10.0, 35.0, 1),
    uniform("humidity", 1.0, 100.0, 2),
    uniform("co2", 300.0, 700.0, 1),
    uniform("wind_speed", 0.0, 15.0, 1),
    uniform("rainfall", 0.0, 50.0, 1),
];

const PLANT: [FieldSpec; 5] = [
    uniform("leaf_moisture", 10.0, 80.0, 2),
    uniform("chlorophyll", 20.0, 60.0, 2),
    uniform("growth_rate", 1.0, 100.0, 2),
    uniform("disease_risk", 0.0, 1.0, 2),
    uniform("stem_diameter", 1.0, 100.0, 2),
];

const THREAT: [FieldSpec; 5] = [
    flag("unauthorized_access"),
    flag("jamming"),
    flag("tampering"),
    flag("spoofing"),
    uniform("anomaly_score", 0.0, 1.0, 2),
];

const WATER: [FieldSpec; 5] = [
    uniform("flow_rate", 1.0, 100.0, 2),
    uniform("water_level", 1.0, 100.0, 2),
    uniform("salinity", 1.0, 100.0, 2),
    uniform("ph", 5.5, 8.5, 2),
    uniform("turbidity", 1.0, 100.0, 2),
];

/// Fields reported by `sensor_type`, in catalogue order.
pub fn catalogue(sensor_type: SensorType) -> &'static [FieldSpec; 5] {
    match sensor_type {
        SensorType::Soil => &SOIL,
        SensorType::Atmospheric => &ATMOSPHERIC,
        SensorType::Plant => &PLANT,
        SensorType::Threat => &THREAT,
        SensorType::Water => &WATER,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Draw one reading cycle for a sensor of `sensor_type`.
pub fn generate_reading<R: Rng + ?Sized>(sensor_type: SensorType, rng: &mut R) -> Readings {
    catalogue(sensor_type)
        .iter()
        .map(|field| {
            let value = match field.kind {
                FieldKind::Uniform { min, max, decimals } => {
                    ReadingValue::Measure(round_to(rng.gen_range(min..=max), decimals))
                }
                FieldKind::Flag => ReadingValue::Flag(u8::from(rng.gen_bool(0.5))),
            };
            (field.name.to_string(), value)
        })
        .collect()
}
