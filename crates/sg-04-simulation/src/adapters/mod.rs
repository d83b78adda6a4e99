//! Adapters layer.

pub mod local_gateway;
