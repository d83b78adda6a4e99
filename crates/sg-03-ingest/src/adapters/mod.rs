//! # Adapters
//!
//! Production and test implementations of the outbound ports.

pub mod alert;
pub mod clock;
pub mod jsonl_log;
pub mod memory;
pub mod snapshot_file;
