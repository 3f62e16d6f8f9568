use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// Length of a well-formed API key in hex characters (128 bits)
pub const API_KEY_LENGTH: usize = 32;

/// Identity used by loopback callers that do not present a well-formed key.
///
/// Every such caller shares this one session slot.
pub const LOOPBACK_API_KEY: &str = "localhost0123456789abcdef0123456789";

/// Number of hex characters of a [`SessionId`] shown in logs and responses
const SESSION_PREFIX_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    #[error("API key must be 32 characters, got {0}")]
    InvalidLength(usize),
    #[error("API key must only contain hexadecimal characters")]
    InvalidCharacter,
}

/// A client-held identity secret
///
/// Doubles as the authentication credential and the encryption passphrase,
/// so it is never logged, displayed or persisted. Servers only keep its
/// [`SessionId`] digest.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validate a caller supplied key: exactly 32 hex characters, any case
    pub fn parse(raw: &str) -> Result<Self, ApiKeyError> {
        if raw.len() != API_KEY_LENGTH {
            return Err(ApiKeyError::InvalidLength(raw.chars().count()));
        }
        if !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ApiKeyError::InvalidCharacter);
        }
        Ok(Self(raw.to_string()))
    }

    /// The shared identity substituted for keyless loopback callers
    pub fn loopback_default() -> Self {
        Self(LOOPBACK_API_KEY.to_string())
    }

    pub fn is_loopback_default(&self) -> bool {
        self.0 == LOOPBACK_API_KEY
    }

    /// Raw secret bytes, for key derivation only
    pub fn secret(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Expose the key text, e.g. to place it in a request header
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// One-way digest naming this identity's session slot
    pub fn session_id(&self) -> SessionId {
        SessionId(Sha256::digest(self.0.as_bytes()).into())
    }
}

impl FromStr for ApiKey {
    type Err = ApiKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// SHA-256 digest of an [`ApiKey`], the key of the session map
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId([u8; 32]);

impl SessionId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated form safe for logs and responses, e.g. `ab12cd34...`
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SESSION_PREFIX_LENGTH);
        hex.push_str("...");
        hex
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_hex_of_either_case() {
        assert!(ApiKey::parse("11112222333344445555666677778888").is_ok());
        assert!(ApiKey::parse("abcdefABCDEF0123456789abcdefABCD").is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        assert_eq!(ApiKey::parse(""), Err(ApiKeyError::InvalidLength(0)));
        assert_eq!(
            ApiKey::parse("1111222233334444555566667777888"),
            Err(ApiKeyError::InvalidLength(31))
        );
        assert_eq!(
            ApiKey::parse("111122223333444455556666777788889"),
            Err(ApiKeyError::InvalidLength(33))
        );
        assert_eq!(
            ApiKey::parse("g1112222333344445555666677778888"),
            Err(ApiKeyError::InvalidCharacter)
        );
        // The loopback constant is deliberately not a valid client key
        assert!(ApiKey::parse(LOOPBACK_API_KEY).is_err());
    }

    #[test]
    fn test_session_id_is_stable_and_distinct() {
        let a = ApiKey::parse("11112222333344445555666677778888").unwrap();
        let b = ApiKey::parse("aaaabbbbccccddddeeeeffff00001111").unwrap();

        assert_eq!(a.session_id(), a.clone().session_id());
        assert_ne!(a.session_id(), b.session_id());
        assert_ne!(a.session_id(), ApiKey::loopback_default().session_id());
    }

    #[test]
    fn test_session_id_is_sha256_of_key() {
        let key = ApiKey::parse("11112222333344445555666677778888").unwrap();
        let expected = hex::encode(Sha256::digest(b"11112222333344445555666677778888"));
        assert_eq!(key.session_id().to_hex(), expected);
        assert_eq!(key.session_id().short(), format!("{}...", &expected[..8]));
    }

    #[test]
    fn test_debug_never_shows_secret() {
        let key = ApiKey::parse("11112222333344445555666677778888").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("1111"));
    }
}
