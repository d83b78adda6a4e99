//! # Key Derivation
//!
//! Two ways to obtain a 128-bit AEAD key for a sensor:
//!
//! - `derive_symmetric_key`: SHA-256 of a provisioning seed, truncated.
//! - `derive_shared_key`: ECDH between the gateway keypair and the sensor's
//!   public key, expanded with HKDF-SHA256 (no salt, info `gateway-sensor`).
//!   Both sides compute the same key from their own private half.

use crate::ecdsa::{SensorKeyPair, SensorPublicKey};
use crate::symmetric::SymmetricKey;
use crate::CryptoError;
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of derived keys in bytes.
pub const DERIVED_KEY_LEN: usize = 16;

/// HKDF info string binding derived keys to gateway/sensor traffic.
pub const SHARED_KEY_INFO: &[u8] = b"gateway-sensor";

/// SHA-256(seed) truncated to 16 bytes.
pub fn derive_symmetric_key(seed: &[u8]) -> SymmetricKey {
    let digest = Sha256::digest(seed);
    let mut bytes = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    bytes.copy_from_slice(&digest[..DERIVED_KEY_LEN]);
    SymmetricKey::from_array(&bytes)
}

/// ECDH + HKDF-SHA256 shared key between `own` and `peer`.
pub fn derive_shared_key(
    own: &SensorKeyPair,
    peer: &SensorPublicKey,
) -> Result<SymmetricKey, CryptoError> {
    let shared = p256::ecdh::diffie_hellman(
        own.signing_key().as_nonzero_scalar(),
        peer.verifying_key().as_affine(),
    );
    let hk = Hkdf::<Sha256>::new(None, shared.raw_secret_bytes());
    let mut okm = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    hk.expand(SHARED_KEY_INFO, &mut okm[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(SymmetricKey::from_array(&okm))
}
