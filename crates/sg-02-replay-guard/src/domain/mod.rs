//! # Domain Layer
//!
//! Replay and rate-window state machines. Time is always passed in.

pub mod config;
pub mod rate_limit;
pub mod replay;
