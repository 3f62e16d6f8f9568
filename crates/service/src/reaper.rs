//! Periodic TTL sweep over the session store
//!
//! Upload-time eviction only runs when there is traffic; the reaper is what
//! bounds memory when nobody calls back.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::store::SessionStore;

/// Spawn the reaper; it runs until `shutdown_rx` fires (or its sender is dropped).
pub fn spawn(
    store: SessionStore,
    every: Duration,
    shutdown_rx: watch::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(run(store, every, shutdown_rx))
}

async fn run(store: SessionStore, every: Duration, mut shutdown_rx: watch::Receiver<()>) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    tracing::debug!(interval_ms = every.as_millis() as u64, "reaper started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = store.sweep();
                if evicted > 0 {
                    tracing::info!(evicted, remaining = store.len(), "reaper evicted expired sessions");
                }
            }
            _ = shutdown_rx.changed() => {
                tracing::debug!("reaper shutting down");
                break;
            }
        }
    }
}
