use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::crypto::{Salt, SealedPayload};

/// Opaque change signal, regenerated on every successful upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateToken(Uuid);

impl StateToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One identity's encrypted payload plus the metadata needed to open and expire it
#[derive(Debug)]
pub(crate) struct SessionRecord {
    pub salt: Salt,
    pub sealed: SealedPayload,
    pub state: StateToken,
    pub created_at: Instant,
}

impl SessionRecord {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }
}
