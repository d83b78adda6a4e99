//! Cross-crate integration tests.

pub mod concurrency;
pub mod e2e_simulation;
pub mod security_flows;
