//! # Shared Crypto - Sensor Gateway Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-128/192/256-GCM | Telemetry confidentiality + integrity |
//! | `ecdsa` | P-256 ECDSA (SHA-256, DER) | Detached anti-spoofing signatures |
//! | `kdf` | SHA-256, ECDH + HKDF-SHA256 | Per-sensor AEAD keys |
//! | `pem` | PKCS#8 / SPKI PEM | Key storage |
//!
//! ## Security Properties
//!
//! - **AES-GCM**: fresh 96-bit OS-random nonce per message, 128-bit tag
//! - **P-256**: RFC 6979 deterministic signing; verification never panics
//! - **Key hygiene**: `SymmetricKey` and signing keys zeroize on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod kdf;
pub mod pem;
pub mod symmetric;

// Re-exports
pub use ecdsa::{generate_keypair, sign, verify, SensorKeyPair, SensorPublicKey};
pub use errors::CryptoError;
pub use kdf::{derive_shared_key, derive_symmetric_key};
pub use pem::{load_private_key, load_public_key, save_private_key, save_public_key};
pub use symmetric::{decrypt, encrypt, AeadNonce, SymmetricKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
