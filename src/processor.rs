/// Slot Processor Module
///
/// The per-slot state machine: idempotency check, classification, and (for
/// confirmed slots) a bounded fetch-transform-publish retry loop with
/// exponential backoff between attempts.
use std::sync::Arc;
use std::time::Instant;

use crate::error::ChainError;
use crate::metrics::Metrics;
use crate::models::{Slot, SlotClassification, SlotState};
use crate::publisher::Publisher;
use crate::retry::RetryPolicy;
use crate::rpc::ChainClient;
use crate::tracker::SlotTracker;
use crate::transform;

pub struct SlotProcessor {
    chain: Arc<dyn ChainClient>,
    publisher: Arc<dyn Publisher>,
    tracker: Arc<SlotTracker>,
    metrics: Arc<Metrics>,
    retry_policy: RetryPolicy,
}

impl SlotProcessor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        publisher: Arc<dyn Publisher>,
        tracker: Arc<SlotTracker>,
        metrics: Arc<Metrics>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self { chain, publisher, tracker, metrics, retry_policy }
    }

    /// Drive `slot` through classification and, for confirmed slots, through
    /// to publication. Returns `Ok(())` once the slot reaches a terminal
    /// state (processed or empty) or has been recorded as still pending.
    pub async fn process(&self, slot: Slot) -> Result<(), ChainError> {
        if self.tracker.is_processed(slot) {
            return Ok(());
        }

        let classification = match self.chain.classify_slot(slot).await {
            Ok(c) => c,
            Err(e) => {
                self.tracker.observe_pending(slot, SlotState::NotAvailable);
                return Err(e);
            }
        };

        match classification {
            SlotClassification::Empty => {
                self.tracker.mark_empty(slot);
                tracing::info!(slot, "empty slot detected");
                Ok(())
            }
            SlotClassification::NotAvailable => {
                self.tracker.observe_pending(slot, SlotState::NotAvailable);
                Ok(())
            }
            SlotClassification::Confirmed => self.process_confirmed(slot).await,
        }
    }

    async fn process_confirmed(&self, slot: Slot) -> Result<(), ChainError> {
        let start = Instant::now();
        let mut last_err = None;

        for attempt in 0..=self.retry_policy.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.retry_policy.backoff(attempt as i64)).await;
            }

            match self.try_publish(slot).await {
                Ok(()) => {
                    let elapsed = start.elapsed();
                    self.metrics.update(slot, elapsed, attempt > 0);
                    self.tracker.mark_processed(slot);
                    tracing::info!(slot, retries = attempt, elapsed_ms = elapsed.as_millis() as u64, "published block");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(slot, attempt, error = %e, "confirmed-slot attempt failed");
                    last_err = Some(e);
                }
            }
        }

        self.metrics.record_failure();
        Err(last_err.unwrap_or(ChainError::Transport("retries exhausted with no recorded error".into())))
    }

    async fn try_publish(&self, slot: Slot) -> Result<(), ChainError> {
        let block = self.chain.fetch_block(slot).await?;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let record = transform::project(&block, now)?;
        self.publisher.publish(&record).await
    }
}
