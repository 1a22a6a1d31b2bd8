//! Driver task that pumps an attribute feed into a monitor

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

use crate::feed::AttributeFeed;
use crate::monitor::ThroughputMonitor;

/// Why the driver task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEnd {
    /// Feed returned `None`
    Exhausted,
    /// Handle cancelled or dropped
    Cancelled,
    /// Consecutive feed errors reached the configured limit
    TooManyErrors,
}

/// Counters reported when the driver task finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    pub applied: u64,
    pub dropped: u64,
    pub end: FeedEnd,
}

/// Handle to a running feed driver; dropping it cancels the task.
pub struct FeedHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<FeedSummary>>,
}

impl FeedHandle {
    /// Request shutdown; the task stops at its next await point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Wait for the task to finish. Returns `None` if it panicked or was aborted.
    pub async fn join(mut self) -> Option<FeedSummary> {
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Spawns the task that feeds attribute updates into a [`ThroughputMonitor`].
pub struct FeedDriver;

impl FeedDriver {
    /// Spawn a driver task on the current tokio runtime.
    ///
    /// Decode failures are logged and the update dropped. Feed errors are
    /// retried with exponential backoff until `max_feed_errors` consecutive
    /// failures. However the task ends, it stops the monitor's sampler.
    pub fn spawn<F>(feed: F, monitor: Arc<ThroughputMonitor>) -> FeedHandle
    where
        F: AttributeFeed,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::feed_task(feed, monitor, cancel.clone()));
        FeedHandle { cancel, task: Some(task) }
    }

    async fn feed_task<F>(
        mut feed: F,
        monitor: Arc<ThroughputMonitor>,
        cancel: CancellationToken,
    ) -> FeedSummary
    where
        F: AttributeFeed,
    {
        info!("Attribute feed driver started");
        let max_errors = monitor.config().max_feed_errors;
        let mut applied = 0u64;
        let mut dropped = 0u64;
        let mut error_count = 0u32;

        let end = loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Attribute feed driver cancelled");
                    break FeedEnd::Cancelled;
                }
                result = feed.next_update() => result,
            };

            match result {
                Ok(Some(update)) => {
                    error_count = 0;
                    match monitor.handle_update(&update) {
                        Ok(outcome) => {
                            applied += 1;
                            trace!("Update {}: {} -> {:?}", applied, update.tag, outcome);
                        }
                        Err(e) => {
                            dropped += 1;
                            warn!("Dropping {} update: {}", update.tag, e);
                        }
                    }
                }
                Ok(None) => {
                    info!("Attribute feed ended after {} updates", applied);
                    break FeedEnd::Exhausted;
                }
                Err(e) => {
                    error_count += 1;
                    error!("Attribute feed error ({}/{}): {}", error_count, max_errors, e);

                    if error_count >= max_errors {
                        error!("Too many attribute feed errors, shutting down");
                        break FeedEnd::TooManyErrors;
                    }

                    // 50ms, 100ms, 200ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("Attribute feed driver cancelled during backoff");
                            break FeedEnd::Cancelled;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        };

        monitor.stop_sampling();
        info!(
            "Attribute feed driver ended ({:?}): {} applied, {} dropped",
            end, applied, dropped
        );
        FeedSummary { applied, dropped, end }
    }
}
