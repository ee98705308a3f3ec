//! Owned timer scheduler.
//!
//! Every timer a session starts (delivery confirmations, the live-traffic
//! loop) is spawned through one `Scheduler`, so a single `shutdown()` cancels
//! and joins all of them.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task`, to be dropped at its next await point on shutdown.
    ///
    /// Returns `false` without spawning once shutdown has begun.
    pub fn spawn<F>(&self, name: &'static str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_shut_down() {
            tracing::debug!("[Scheduler] refusing to spawn '{}' after shutdown", name);
            return false;
        }

        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("[Scheduler] '{}' cancelled", name);
                }
                _ = task => {}
            }
        });
        true
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels all outstanding tasks and waits for them to exit.
    ///
    /// Idempotent.
    pub async fn shutdown(&self) {
        if !self.is_shut_down() {
            tracing::info!(
                "[Scheduler] shutting down, {} task(s) outstanding",
                self.tracker.len()
            );
        }
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_timers() {
        let scheduler = Scheduler::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        assert!(scheduler.spawn("timer", async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        }));
        assert_eq!(scheduler.pending(), 1);

        scheduler.shutdown().await;
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_after_shutdown_is_refused() {
        let scheduler = Scheduler::new();
        scheduler.shutdown().await;
        assert!(scheduler.is_shut_down());
        assert!(!scheduler.spawn("late", async {}));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_tasks_are_released() {
        let scheduler = Scheduler::new();
        scheduler.spawn("quick", async {
            tokio::time::sleep(Duration::from_millis(5)).await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(scheduler.pending(), 0);
        scheduler.shutdown().await;
    }
}
