use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::store::SessionStore;

/// Main service state shared by every request handler
#[derive(Debug, Clone)]
pub struct State {
    store: SessionStore,
    config: Arc<Config>,
    started_at: Instant,
}

impl State {
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build state around a specific clock (tests drive TTLs with a manual one)
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        tracing::debug!(limits = ?config.limits, "ServiceState::from_config - creating session store");
        Self {
            store: SessionStore::with_clock(config.limits, clock),
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl AsRef<SessionStore> for State {
    fn as_ref(&self) -> &SessionStore {
        &self.store
    }
}
