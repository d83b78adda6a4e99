//! # ECDSA Signatures (P-256)
//!
//! Detached signatures used by sensors configured with asymmetric spoofing
//! protection.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - SHA-256 message digest, DER-encoded signatures
//! - `verify` is total: malformed signatures or keys yield `false`, never a
//!   panic or an error

use crate::CryptoError;
use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// P-256 public key of a sensor (or of the gateway).
#[derive(Clone, Debug)]
pub struct SensorPublicKey(VerifyingKey);

impl SensorPublicKey {
    /// Parse a SEC1-encoded point (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// SEC1 encoding of the point.
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_sec1_bytes().into_vec()
    }

    /// Verify a detached signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify(self, message, signature)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }

    pub(crate) fn from_verifying_key(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl PartialEq for SensorPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_sec1_bytes() == other.to_sec1_bytes()
    }
}

impl Eq for SensorPublicKey {}

/// P-256 ECDSA keypair. The signing key zeroizes its scalar on drop.
#[derive(Clone)]
pub struct SensorKeyPair {
    signing_key: SigningKey,
}

impl SensorKeyPair {
    /// Generate random keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Create from secret scalar bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Secret scalar bytes, wiped when the returned buffer is dropped.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }

    /// Public half.
    pub fn public_key(&self) -> SensorPublicKey {
        SensorPublicKey(VerifyingKey::from(&self.signing_key))
    }

    /// Sign a message (deterministic RFC 6979), DER encoded.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_der().as_bytes().to_vec()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub(crate) fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }
}

impl std::fmt::Debug for SensorKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Generate a fresh P-256 keypair.
pub fn generate_keypair() -> SensorKeyPair {
    SensorKeyPair::generate()
}

/// Sign `message` with `keypair`; returns a DER-encoded signature.
pub fn sign(keypair: &SensorKeyPair, message: &[u8]) -> Vec<u8> {
    keypair.sign(message)
}

/// Verify a detached signature. Accepts DER and fixed 64-byte `r || s`.
///
/// Returns `false` for any malformed input.
pub fn verify(public: &SensorPublicKey, message: &[u8], signature: &[u8]) -> bool {
    let parsed = Signature::from_der(signature).or_else(|_| Signature::from_slice(signature));
    match parsed {
        Ok(sig) => public.0.verify(message, &sig).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sign_verify() {
        let keypair = generate_keypair();
        let message = b"{\"sensor_id\":\"plant_03\"}";
        let signature = sign(&keypair, message);
        assert!(verify(&keypair.public_key(), message, &signature));
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = generate_keypair();
        let signature = keypair.sign(b"message1");
        assert!(!keypair.public_key().verify(b"message2", &signature));
    }

    #[test]
    fn test_wrong_key_fails() {
        let signature = generate_keypair().sign(b"message");
        assert!(!generate_keypair().public_key().verify(b"message", &signature));
    }

    #[test]
    fn test_fixed_width_signature_accepted() {
        let keypair = generate_keypair();
        let der = keypair.sign(b"payload");
        let fixed = Signature::from_der(&der).unwrap().to_bytes();
        assert_eq!(fixed.len(), 64);
        assert!(verify(&keypair.public_key(), b"payload", &fixed));
    }

    #[test]
    fn test_malformed_signatures_return_false() {
        let public = generate_keypair().public_key();
        assert!(!verify(&public, b"m", &[]));
        assert!(!verify(&public, b"m", &[0x30, 0x02, 0x01]));
        assert!(!verify(&public, b"m", &[0u8; 64]));
        assert!(!verify(&public, b"m", &[0xffu8; 71]));
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = SensorKeyPair::from_bytes(&[0xABu8; 32]).unwrap();
        assert_eq!(keypair.sign(b"deterministic"), keypair.sign(b"deterministic"));
    }

    #[test]
    fn test_roundtrip_bytes() {
        let original = generate_keypair();
        let restored = SensorKeyPair::from_bytes(&original.secret_bytes()).unwrap();
        assert_eq!(original.public_key(), restored.public_key());

        let public = SensorPublicKey::from_sec1_bytes(&original.public_key().to_sec1_bytes());
        assert_eq!(public.unwrap(), original.public_key());
        assert!(SensorPublicKey::from_sec1_bytes(&[4u8; 10]).is_err());
    }

    proptest! {
        #[test]
        fn prop_verify_never_panics(garbage in proptest::collection::vec(any::<u8>(), 0..100)) {
            let public = SensorKeyPair::from_bytes(&[0x11u8; 32]).unwrap().public_key();
            prop_assert!(!verify(&public, b"message", &garbage));
        }
    }
}
