//! Service layer: fleet provisioning and the simulation engine.

pub mod engine;
pub mod fleet;
