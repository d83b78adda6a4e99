//! # Runtime Adapters
//!
//! Bridges from subsystem ports to process-wide infrastructure.

mod prometheus;

pub use prometheus::PrometheusRecorder;
