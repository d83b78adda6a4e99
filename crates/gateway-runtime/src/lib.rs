//! # Gateway Runtime Library
//!
//! Exposes the runtime's modules for testing. The entry point is the
//! `sensor-gateway` binary in `main.rs`.
//!
//! - `config/` - `SG_*` environment configuration
//! - `keys/` - key directory loading and fleet provisioning
//! - `adapters/` - Prometheus-backed metrics recorder
//! - `runtime/` - wiring plus the simulate and live run modes

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod config;
pub mod keys;
pub mod runtime;

pub use config::{ConfigError, GatewayConfig, RunMode};
pub use keys::{load_or_create, provision_fleet, KeyError};
pub use runtime::{GatewayRuntime, LiveReport, RuntimeError};
