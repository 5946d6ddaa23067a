//! Periodic removal of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::store::SessionStore;

/// Purges idle sessions on a fixed interval.
///
/// Lookups already expire idle sessions lazily; this task only reclaims
/// memory held by sessions nobody asks about again.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    store: Arc<SessionStore>,
    interval: Duration,
}

impl SessionCleanup {
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs a single cleanup cycle. Returns the number of sessions removed.
    pub async fn run_cleanup(&self) -> usize {
        let purged = self.store.purge_expired().await;
        if purged > 0 {
            info!(
                purged = purged,
                remaining = self.store.len(),
                "Session cleanup completed"
            );
        }
        purged
    }

    /// Runs cleanup cycles until `cancel` turns `true` or its sender drops.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Session cleanup started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; nothing can be idle yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cleanup().await;
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        debug!("Session cleanup shutting down");
                        break;
                    }
                }
            }
        }
    }
}
