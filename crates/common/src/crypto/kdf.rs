//! Password-based key derivation
//!
//! Identity secrets are short, human-transportable strings, so they are stretched
//! with PBKDF2-HMAC-SHA256 before being used as an AES-256 key.

use std::fmt;
use std::ops::Deref;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{fill_random, CryptoError};

/// Number of PBKDF2 iterations
pub const PBKDF2_ROUNDS: u32 = 10_000;
/// Size of a derived key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;
/// Size of a per-record salt in bytes
pub const SALT_SIZE: usize = 32;

/// Random per-record salt, regenerated on every upload
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Draw a new salt from the system RNG
    pub fn generate() -> Result<Self, CryptoError> {
        let mut buff = [0u8; SALT_SIZE];
        fill_random(&mut buff)?;
        Ok(Self(buff))
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<[u8; SALT_SIZE]> for Salt {
    fn from(bytes: [u8; SALT_SIZE]) -> Self {
        Salt(bytes)
    }
}

impl Deref for Salt {
    type Target = [u8; SALT_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&"..").finish()
    }
}

/// A 256-bit AES key derived from an identity secret and a [`Salt`]
///
/// Lives only for the duration of a single seal/open operation and is
/// zeroized when dropped. There is intentionally no way to serialize it.
///
/// # Examples
///
/// ```
/// use common::crypto::{DerivedKey, Salt};
///
/// let salt = Salt::generate().unwrap();
/// let a = DerivedKey::derive(b"11112222333344445555666677778888", &salt);
/// let b = DerivedKey::derive(b"11112222333344445555666677778888", &salt);
/// assert_eq!(a, b);
/// ```
#[derive(Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    /// Run PBKDF2-HMAC-SHA256 over `(secret, salt)`
    ///
    /// Deterministic: the same inputs always produce the same key, while two
    /// different salts produce unrelated keys for the same secret.
    pub fn derive(secret: &[u8], salt: &Salt) -> Self {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(secret, salt.bytes(), PBKDF2_ROUNDS, &mut key);
        let derived = Self(key);
        key.zeroize();
        derived
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &[u8] = b"11112222333344445555666677778888";

    #[test]
    fn test_derive_is_deterministic() {
        let salt = Salt::from([7u8; SALT_SIZE]);
        assert_eq!(
            DerivedKey::derive(SECRET, &salt),
            DerivedKey::derive(SECRET, &salt)
        );
    }

    #[test]
    fn test_different_salts_give_different_keys() {
        let a = Salt::from([1u8; SALT_SIZE]);
        let b = Salt::from([2u8; SALT_SIZE]);
        assert_ne!(DerivedKey::derive(SECRET, &a), DerivedKey::derive(SECRET, &b));
    }

    #[test]
    fn test_different_secrets_give_different_keys() {
        let salt = Salt::from([3u8; SALT_SIZE]);
        assert_ne!(
            DerivedKey::derive(SECRET, &salt),
            DerivedKey::derive(b"aaaabbbbccccddddeeeeffff00001111", &salt)
        );
    }

    #[test]
    fn test_generated_salts_are_fresh() {
        let a = Salt::generate().unwrap();
        let b = Salt::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let salt = Salt::from([9u8; SALT_SIZE]);
        let key = DerivedKey::derive(SECRET, &salt);
        assert_eq!(format!("{:?}", key), "DerivedKey(<redacted>)");
        assert!(!format!("{:?}", salt).contains('9'));
    }
}
