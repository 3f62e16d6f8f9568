//! Cryptographic primitives for sample-relay
//!
//! The server never keeps an uploaded payload in the clear. Every stored record is
//! sealed under a key that only exists for the duration of a single operation:
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256 (10,000 rounds) over the caller's identity
//!   secret and a random per-record 32-byte [`Salt`], yielding a 256-bit [`DerivedKey`]
//! - **Encryption**: AES-256-GCM with a fresh random nonce per call and a constant
//!   associated-data label that binds ciphertexts to this protocol
//!
//! # Record lifecycle
//!
//! 1. On upload a new salt is drawn, the key is derived and the JSON payload is sealed
//!    into a [`SealedPayload`] (`nonce`, `ciphertext`, `tag`); the key is dropped
//!    (and zeroized) immediately afterwards
//! 2. On retrieval the key is re-derived from the presented secret and the stored
//!    salt; a wrong secret, a corrupted salt or a tampered ciphertext all fail the
//!    tag check and surface as [`CryptoError::Decrypt`]
//!
//! Error values and `Debug` output never contain key material.

mod kdf;
mod sealed;

pub use kdf::{DerivedKey, Salt, KEY_SIZE, PBKDF2_ROUNDS, SALT_SIZE};
pub use sealed::{SealedPayload, ASSOCIATED_DATA, NONCE_SIZE, TAG_SIZE};

/// Errors raised by key derivation, sealing and opening
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("system randomness unavailable")]
    Rng,
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed: authentication tag mismatch")]
    Decrypt,
    #[error("decrypted payload is not valid JSON")]
    Corrupt,
    #[error("payload could not be serialized")]
    Serialize,
}

/// Fill `buf` from the operating system RNG
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|_| CryptoError::Rng)
}
