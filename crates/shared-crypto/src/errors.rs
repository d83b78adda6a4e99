//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key length is not one of 16, 24 or 32 bytes.
    #[error("Invalid key length: expected 16, 24 or 32 bytes, got {actual}")]
    InvalidKeyLength {
        /// Actual key length in bytes
        actual: usize,
    },

    /// AEAD tag did not verify (wrong key, tampered or truncated ciphertext).
    #[error("Authentication failed")]
    AuthenticationFailure,

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// PEM / PKCS#8 / SPKI encoding or decoding failed
    #[error("Key encoding failed: {0}")]
    KeyEncoding(String),

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Reading or writing a key file failed
    #[error("Key file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
