//! # Replay Guard Subsystem (SG-02)
//!
//! Rejects replayed and stale telemetry, and tracks how fast each sensor is
//! sending.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): nonce cache, sliding request windows and
//!   their configuration. No I/O; the caller supplies `now`.
//!
//! ## Security Notes
//!
//! - **Nonce before clock**: a nonce that was already recorded is a replay
//!   even if its timestamp is also stale.
//! - **Atomic check-and-insert**: the lookup, freshness test and insertion run
//!   under one lock, so two concurrent copies of a message cannot both pass.
//! - **Bounded memory**: recorded nonces are pruned after twice the freshness
//!   window; a replay that old is already rejected as stale.

pub mod domain;

// Re-export public API
pub use domain::config::{RateLimitConfig, RateLimitPolicy, ReplayConfig, ReplayConfigError};
pub use domain::rate_limit::{Admission, RateDecision, SensorRateLimiter, SlidingWindowRateLimiter};
pub use domain::replay::{ReplayGuard, ReplayVerdict};
