//! Payload sealing using AES-256-GCM

use std::fmt;

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use serde_json::Value;

use super::{fill_random, CryptoError, DerivedKey};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;
/// Associated data bound into every ciphertext
pub const ASSOCIATED_DATA: &[u8] = b"session-data";

/// An encrypted payload as it is held by the session store
///
/// The three parts are kept separate (detached tag) so that a record can
/// report which of them are present when a decryption fails.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl SealedPayload {
    /// Length of the ciphertext, equal to the plaintext length
    pub fn len(&self) -> usize {
        self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

impl fmt::Debug for SealedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedPayload")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl DerivedKey {
    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.bytes()))
    }

    /// Encrypt `plaintext` under this key with a fresh random nonce
    ///
    /// # Errors
    ///
    /// Returns an error only if the system RNG or the cipher itself fails.
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedPayload, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        fill_random(&mut nonce)?;

        let mut ciphertext = plaintext.to_vec();
        let tag = self
            .cipher()
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), ASSOCIATED_DATA, &mut ciphertext)
            .map_err(|_| CryptoError::Encrypt)?;

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(tag.as_slice());

        Ok(SealedPayload {
            nonce,
            ciphertext,
            tag: tag_bytes,
        })
    }

    /// Verify and decrypt a sealed payload
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decrypt`] if the tag does not verify: the payload was
    /// tampered with, or this key was derived from the wrong secret or salt.
    pub fn open(&self, sealed: &SealedPayload) -> Result<Vec<u8>, CryptoError> {
        let mut plaintext = sealed.ciphertext.clone();
        self.cipher()
            .decrypt_in_place_detached(
                Nonce::from_slice(&sealed.nonce),
                ASSOCIATED_DATA,
                &mut plaintext,
                Tag::from_slice(&sealed.tag),
            )
            .map_err(|_| CryptoError::Decrypt)?;
        Ok(plaintext)
    }

    /// Serialize a JSON value compactly and seal it
    pub fn seal_json(&self, value: &Value) -> Result<SealedPayload, CryptoError> {
        let bytes = serde_json::to_vec(value).map_err(|_| CryptoError::Serialize)?;
        self.seal(&bytes)
    }

    /// Open a sealed payload and parse it back into JSON
    ///
    /// # Errors
    ///
    /// In addition to the failures of [`DerivedKey::open`], returns
    /// [`CryptoError::Corrupt`] if the authenticated plaintext is not valid JSON.
    pub fn open_json(&self, sealed: &SealedPayload) -> Result<Value, CryptoError> {
        let bytes = self.open(sealed)?;
        serde_json::from_slice(&bytes).map_err(|_| CryptoError::Corrupt)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::crypto::Salt;

    const SECRET: &[u8] = b"11112222333344445555666677778888";

    fn key() -> DerivedKey {
        DerivedKey::derive(SECRET, &Salt::from([5u8; 32]))
    }

    #[test]
    fn test_seal_open() {
        let key = key();
        let data = b"hello world, this is a test message for encryption";

        let sealed = key.seal(data).unwrap();
        assert_eq!(sealed.len(), data.len());
        assert_ne!(sealed.ciphertext.as_slice(), data.as_slice());

        let opened = key.open(&sealed).unwrap();
        assert_eq!(opened.as_slice(), data.as_slice());
    }

    #[test]
    fn test_json_seal_open() {
        let key = key();
        let value = json!({"a": 1, "nested": {"list": [1, 2, 3], "s": "x"}});

        let sealed = key.seal_json(&value).unwrap();
        assert_eq!(key.open_json(&sealed).unwrap(), value);
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let key = key();
        let a = key.seal(b"same input").unwrap();
        let b = key.seal(b"same input").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = key().seal(b"secret stuff").unwrap();
        let other = DerivedKey::derive(b"aaaabbbbccccddddeeeeffff00001111", &Salt::from([5u8; 32]));
        assert_eq!(other.open(&sealed), Err(CryptoError::Decrypt));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let sealed = key().seal(b"secret stuff").unwrap();
        let other = DerivedKey::derive(SECRET, &Salt::from([6u8; 32]));
        assert_eq!(other.open(&sealed), Err(CryptoError::Decrypt));
    }

    #[test]
    fn test_tampering_is_detected() {
        let key = key();
        let sealed = key.seal(b"integrity matters").unwrap();

        let mut flipped = sealed.clone();
        flipped.ciphertext[3] ^= 0xFF;
        assert_eq!(key.open(&flipped), Err(CryptoError::Decrypt));

        let mut bad_tag = sealed.clone();
        bad_tag.tag[0] ^= 0x01;
        assert_eq!(key.open(&bad_tag), Err(CryptoError::Decrypt));

        let mut bad_nonce = sealed;
        bad_nonce.nonce[0] ^= 0x01;
        assert_eq!(key.open(&bad_nonce), Err(CryptoError::Decrypt));
    }

    #[test]
    fn test_non_json_plaintext_is_corrupt() {
        let key = key();
        let sealed = key.seal(b"{not json").unwrap();
        assert_eq!(key.open_json(&sealed), Err(CryptoError::Corrupt));
    }

    #[test]
    fn test_empty_payload() {
        let key = key();
        let sealed = key.seal(b"").unwrap();
        assert!(sealed.is_empty());
        assert_eq!(key.open(&sealed).unwrap(), Vec::<u8>::new());
    }
}
