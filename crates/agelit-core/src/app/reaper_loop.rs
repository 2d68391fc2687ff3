//! ReaperLoop - periodic eviction of old terminal tasks.
//!
//! # Lifecycle
//! - **spawn**: starts the loop on the current tokio runtime
//! - **request_shutdown**: stops it after the current sweep
//! - **shutdown_and_join**: stops it and waits for the task to end

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::registry::TaskRegistry;

/// Background sweep over a [`TaskRegistry`].
pub struct ReaperLoop;

impl ReaperLoop {
    /// Start sweeping every `interval` until the handle shuts it down.
    ///
    /// The first sweep happens one interval after spawning.
    pub fn spawn(registry: TaskRegistry, interval: Duration) -> ReaperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            info!(?interval, retention = %registry.retention(), "reaper started");
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }

                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        // sender dropped counts as shutdown
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                let evicted = registry.reap_expired().await;
                if evicted > 0 {
                    info!(evicted, "reaped expired tasks");
                } else {
                    debug!("reaper sweep found nothing to evict");
                }
            }
            info!("reaper stopped");
        });

        ReaperHandle { shutdown_tx, join }
    }
}

/// Owner of a running reaper.
///
/// Dropping the handle also stops the loop, at its next wake-up.
pub struct ReaperHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReaperHandle {
    pub fn request_shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}
