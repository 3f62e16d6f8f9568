//! Session relay service for sample-relay.
//!
//! This crate provides everything the `relay` binary runs:
//! - Session store (sealed, single-use, TTL bounded records keyed by identity digest)
//! - Caller admission (API keys with a loopback bypass)
//! - Reaper (background TTL sweep)
//! - HTTP handlers and a typed client for the `/api/v1` surface

pub mod auth;
pub mod clock;
pub mod config;
pub mod http;
pub mod process;
pub mod reaper;
pub mod state;
pub mod store;

// Re-export key types for convenience
pub use config::{CapacityPolicy, Config, ConfigError, Limits};
pub use process::{init_logging, spawn_service, start_service, ServiceError, ShutdownHandle};
pub use state::State as ServiceState;
pub use store::{SessionStore, StoreError};
