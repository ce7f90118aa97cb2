/// Retry Sweeper Module
///
/// Periodically re-walks every slot the tracker still considers pending,
/// re-running the Slot Processor on each so deferred slots eventually
/// resolve without blocking the tip driver's forward progress.
use std::sync::Arc;

use tokio::sync::watch;

use crate::processor::SlotProcessor;
use crate::tracker::SlotTracker;

pub struct RetrySweeper {
    processor: Arc<SlotProcessor>,
    tracker: Arc<SlotTracker>,
}

impl RetrySweeper {
    pub fn new(processor: Arc<SlotProcessor>, tracker: Arc<SlotTracker>) -> Self {
        Self { processor, tracker }
    }

    pub async fn run(self, interval: std::time::Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    async fn sweep(&self) {
        let pending = self.tracker.list_pending();
        if pending.is_empty() {
            return;
        }
        tracing::info!(count = pending.len(), "sweeping pending slots");

        for slot in pending {
            if let Err(e) = self.processor.process(slot).await {
                tracing::warn!(slot, error = %e, "retry sweep still failing for slot");
            }
        }
    }
}
