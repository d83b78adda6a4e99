//! # Sensor Simulation Subsystem (SG-04)
//!
//! Drives the gateway with a fleet of virtual sensors in simulated time.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): sensor catalogue, network topology and
//!   router, event queue, virtual sensors
//! - **Ports Layer** (`ports/`): `TelemetryGateway`, the gateway as seen by
//!   the simulator
//! - **Adapters** (`adapters/`): `LocalGateway` over the in-process sg-03
//!   pipeline
//! - **Service Layer** (`service/`): fleet provisioning and `SensorSimEngine`
//!
//! ## Event Model
//!
//! ```text
//! t ──→ [Emit soil_01] ──→ seal ──→ route (log) ──→ gateway.deliver ──→ reschedule t + U(5,10)
//!   └─→ [Flush]        ──→ gateway.flush ──→ reschedule t + flush_interval
//! ```
//!
//! Events at the same instant run emissions first, in sensor-id order, then
//! the flush.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::local_gateway::LocalGateway;
pub use domain::catalogue::{catalogue, generate_reading, FieldKind, FieldSpec};
pub use domain::errors::SimulationError;
pub use domain::scheduler::{Event, EventKey, EventKind, EventQueue, SimTime};
pub use domain::sensor::VirtualSensor;
pub use domain::topology::{NetworkTopology, Router};
pub use ports::outbound::TelemetryGateway;
pub use service::engine::{SensorSimEngine, SimulationConfig, SimulationReport, DEFAULT_GATEWAY_ID};
pub use service::fleet::Fleet;
