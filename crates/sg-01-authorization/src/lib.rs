//! # Authorization Subsystem (SG-01)
//!
//! Decides which sensors may talk to the gateway and holds the credential
//! each one uses.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): identities, credentials and the registry
//!
//! The registry is populated once at provisioning time and is read-only
//! afterwards, so the gateway shares it behind an `Arc` without a lock.
//!
//! ## Security Notes
//!
//! - **Type-scoped allow-lists**: a sensor is authorized only if the prefix of
//!   its id names a known type and the id is on that type's list.
//! - **No crypto before authorization**: `is_authorized` is a pair of hash
//!   lookups, so unlisted senders cost nothing to reject.

pub mod domain;

// Re-export public API
pub use domain::entities::{default_fleet, Credential, SensorIdentity, SENSORS_PER_TYPE};
pub use domain::errors::AuthorizationError;
pub use domain::registry::AuthorizationRegistry;
