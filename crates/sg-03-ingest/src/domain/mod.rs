//! # Domain Layer
//!
//! Ingest outcomes and the in-memory aggregation of accepted readings.

pub mod errors;
pub mod result;
pub mod store;
