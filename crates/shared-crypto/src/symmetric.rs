//! # Symmetric Encryption
//!
//! AES-GCM authenticated encryption. The key length selects the variant:
//! 16 bytes for AES-128-GCM, 24 for AES-192-GCM, 32 for AES-256-GCM.
//!
//! ## Security Properties
//!
//! - **Fresh nonce per call**: 96-bit nonce drawn from the OS RNG.
//! - **Tag appended**: the 16-byte tag is the tail of the ciphertext; any
//!   wrong key, flipped bit or truncation fails with `AuthenticationFailure`.
//! - **Length checked first**: an unsupported key length is reported before
//!   any cipher is constructed.

use crate::CryptoError;
use aes_gcm::{
    aead::{consts::U12, generic_array::GenericArray, Aead, AeadCore, KeyInit},
    Aes128Gcm, Aes256Gcm, AesGcm,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-192-GCM with the standard 96-bit nonce.
type Aes192Gcm = AesGcm<aes::Aes192, U12>;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Key lengths accepted by `encrypt` / `decrypt`.
pub const SUPPORTED_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Symmetric AEAD key (128, 192 or 256 bit). Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl SymmetricKey {
    /// Create from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` unless the length is 16, 24 or 32.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        check_key_length(bytes)?;
        Ok(Self(bytes.to_vec()))
    }

    /// Wrap a 128-bit key.
    pub fn from_array(bytes: &[u8; 16]) -> Self {
        Self(bytes.to_vec())
    }

    /// Generate a random 128-bit key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey({} bytes)", self.0.len())
    }
}

/// 96-bit AES-GCM nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AeadNonce([u8; NONCE_LEN]);

impl AeadNonce {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Draw a fresh nonce from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

#[derive(Clone, Copy)]
enum AesVariant {
    Aes128,
    Aes192,
    Aes256,
}

fn check_key_length(key: &[u8]) -> Result<AesVariant, CryptoError> {
    match key.len() {
        16 => Ok(AesVariant::Aes128),
        24 => Ok(AesVariant::Aes192),
        32 => Ok(AesVariant::Aes256),
        actual => Err(CryptoError::InvalidKeyLength { actual }),
    }
}

fn seal<C>(key: &[u8], nonce: &AeadNonce, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;
    cipher
        .encrypt(GenericArray::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

fn open<C>(key: &[u8], nonce: &AeadNonce, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;
    cipher
        .decrypt(GenericArray::from_slice(nonce.as_bytes()), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

/// Encrypt plaintext with AES-GCM under a fresh random nonce.
///
/// Returns (nonce, ciphertext || tag).
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyLength` for unsupported key sizes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<(AeadNonce, Vec<u8>), CryptoError> {
    let variant = check_key_length(key)?;
    let nonce = AeadNonce::generate();
    let ciphertext = match variant {
        AesVariant::Aes128 => seal::<Aes128Gcm>(key, &nonce, plaintext)?,
        AesVariant::Aes192 => seal::<Aes192Gcm>(key, &nonce, plaintext)?,
        AesVariant::Aes256 => seal::<Aes256Gcm>(key, &nonce, plaintext)?,
    };
    Ok((nonce, ciphertext))
}

/// Decrypt and authenticate AES-GCM ciphertext.
///
/// # Errors
///
/// - `CryptoError::InvalidKeyLength` if the key is not 16, 24 or 32 bytes,
///   checked before any decryption attempt.
/// - `CryptoError::AuthenticationFailure` if the tag does not verify.
pub fn decrypt(nonce: &AeadNonce, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match check_key_length(key)? {
        AesVariant::Aes128 => open::<Aes128Gcm>(key, nonce, ciphertext),
        AesVariant::Aes192 => open::<Aes192Gcm>(key, nonce, ciphertext),
        AesVariant::Aes256 => open::<Aes256Gcm>(key, nonce, ciphertext),
    }
}
