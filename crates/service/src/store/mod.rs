//! Ephemeral, single-use, encrypted session store
//!
//! Maps the digest of an identity secret to at most one sealed payload. Every
//! operation runs its whole read-check-write sequence under one store-wide lock,
//! so a record is only ever observed as a complete generation and a payload is
//! handed out at most once, however many callers race for it.

mod record;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;

use common::api_key::{ApiKey, SessionId};
use common::crypto::{CryptoError, DerivedKey, Salt};

use crate::clock::{Clock, SystemClock};
use crate::config::{CapacityPolicy, Limits};

pub use record::StateToken;
use record::SessionRecord;

type Sessions = HashMap<SessionId, SessionRecord>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("payload must be a JSON object or array")]
    InvalidPayload,
    #[error("payload of {received} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { max: usize, received: usize },
    #[error("maximum number of sessions reached ({current}/{max})")]
    ResourceExhausted { max: usize, current: usize },
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct Receipt {
    pub state: StateToken,
    pub session_id: SessionId,
    pub replaced: bool,
}

/// Read-only snapshot for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStatus {
    pub live: usize,
    pub limits: Limits,
}

impl StoreStatus {
    pub fn available(&self) -> usize {
        self.limits.max_sessions.saturating_sub(self.live)
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<Sessions>>,
    limits: Limits,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(limits: Limits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: Limits, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            limits,
            clock,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Seal `payload` under `key`, replacing any record the identity already holds.
    ///
    /// Expired records are evicted first. The capacity check then runs before the
    /// identity is resolved: under [`CapacityPolicy::Strict`] a full store rejects
    /// even an upload that would only overwrite the caller's own record.
    pub fn upload(&self, key: &ApiKey, payload: &Value) -> Result<Receipt, StoreError> {
        let mut sessions = self.sessions.lock();
        let now = self.clock.now();
        self.evict_expired(&mut sessions, now);

        let session_id = key.session_id();
        let current = sessions.len();
        if current >= self.limits.max_sessions {
            let may_replace = self.limits.capacity_policy == CapacityPolicy::AllowReplace
                && sessions.contains_key(&session_id);
            if !may_replace {
                tracing::warn!(
                    session = %session_id,
                    current,
                    max = self.limits.max_sessions,
                    "rejecting upload, session capacity reached"
                );
                return Err(StoreError::ResourceExhausted {
                    max: self.limits.max_sessions,
                    current,
                });
            }
        }

        if !(payload.is_object() || payload.is_array()) {
            return Err(StoreError::InvalidPayload);
        }
        let plaintext = serde_json::to_vec(payload).map_err(|_| StoreError::InvalidPayload)?;
        if plaintext.len() > self.limits.max_sample_size {
            return Err(StoreError::PayloadTooLarge {
                max: self.limits.max_sample_size,
                received: plaintext.len(),
            });
        }

        let salt = Salt::generate()?;
        let sealed = DerivedKey::derive(key.secret(), &salt)
            .seal(&plaintext)
            .map_err(|e| {
                tracing::error!(
                    operation = "encrypt",
                    session = %session_id,
                    payload_len = plaintext.len(),
                    live = sessions.len(),
                    error = %e,
                    "failed to seal session payload"
                );
                e
            })?;

        let state = StateToken::generate();
        let replaced = sessions
            .insert(
                session_id,
                SessionRecord {
                    salt,
                    sealed,
                    state,
                    created_at: now,
                },
            )
            .is_some();

        tracing::info!(
            session = %session_id,
            replaced,
            live = sessions.len(),
            max = self.limits.max_sessions,
            "session stored"
        );

        Ok(Receipt {
            state,
            session_id,
            replaced,
        })
    }

    /// Open and consume the identity's record.
    ///
    /// Returns `Ok(None)` when there is no live record. A record that fails to
    /// decrypt is left in place so the caller can retry with the right secret.
    pub fn retrieve(&self, key: &ApiKey) -> Result<Option<Value>, StoreError> {
        let session_id = key.session_id();
        let mut sessions = self.sessions.lock();
        let now = self.clock.now();

        let opened = match sessions.get(&session_id) {
            None => return Ok(None),
            Some(record) if record.is_expired(now, self.limits.session_ttl) => None,
            Some(record) => Some(
                DerivedKey::derive(key.secret(), &record.salt)
                    .open_json(&record.sealed)
                    .map_err(|e| {
                        tracing::error!(
                            operation = "decrypt",
                            session = %session_id,
                            record_present = true,
                            ciphertext_len = record.sealed.len(),
                            age_ms = record.age(now).as_millis() as u64,
                            error = %e,
                            "failed to open session payload"
                        );
                        e
                    }),
            ),
        };

        match opened {
            None => {
                sessions.remove(&session_id);
                tracing::debug!(session = %session_id, "dropped expired session on access");
                Ok(None)
            }
            Some(Ok(payload)) => {
                sessions.remove(&session_id);
                tracing::info!(session = %session_id, "payload retrieved and session cleared");
                Ok(Some(payload))
            }
            Some(Err(e)) => Err(e.into()),
        }
    }

    /// Current state token of the identity's live record, without consuming it
    pub fn peek_state(&self, key: &ApiKey) -> Option<StateToken> {
        let session_id = key.session_id();
        let sessions = self.sessions.lock();
        let now = self.clock.now();
        sessions
            .get(&session_id)
            .filter(|record| !record.is_expired(now, self.limits.session_ttl))
            .map(|record| record.state)
    }

    pub fn status(&self) -> StoreStatus {
        let sessions = self.sessions.lock();
        let now = self.clock.now();
        let live = sessions
            .values()
            .filter(|record| !record.is_expired(now, self.limits.session_ttl))
            .count();
        StoreStatus {
            live,
            limits: self.limits,
        }
    }

    /// Remove every expired record, returning how many were dropped
    pub fn sweep(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let now = self.clock.now();
        self.evict_expired(&mut sessions, now)
    }

    /// Number of records held, expired or not
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_expired(&self, sessions: &mut Sessions, now: Instant) -> usize {
        let ttl = self.limits.session_ttl;
        let before = sessions.len();
        sessions.retain(|session_id, record| {
            let expired = record.is_expired(now, ttl);
            if expired {
                tracing::info!(session = %session_id, "cleaned up expired session");
            }
            !expired
        });
        before - sessions.len()
    }
}
