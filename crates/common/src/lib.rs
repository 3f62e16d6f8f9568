/**
 * Cryptographic primitives for relayed payloads.
 *  - Password-based key derivation from an identity secret
 *  - Authenticated encryption of JSON payloads
 */
pub mod crypto;
/**
 * Client-held identity secrets and the session
 *  digests derived from them.
 */
pub mod api_key;
/**
 * Version and platform information
 *  for the running binary.
 */
pub mod version;

pub mod prelude {
    pub use crate::api_key::{ApiKey, ApiKeyError, SessionId};
    pub use crate::crypto::{CryptoError, DerivedKey, Salt, SealedPayload};
    pub use crate::version::build_info;
}
