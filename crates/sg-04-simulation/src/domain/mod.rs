//! Domain layer: catalogue, topology, event queue and virtual sensors.

pub mod catalogue;
pub mod errors;
pub mod scheduler;
pub mod sensor;
pub mod topology;
