/// Tip Driver Module
///
/// Owns the advancing chain tip and the list of slots the processor could
/// not resolve on their first pass, both as exclusive local task state (no
/// extra lock: only this task ever touches them). On each tick it walks
/// every slot between the previous tip and the new one through the Slot
/// Processor, then retries everything still outstanding in `missing`.
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ChainError;
use crate::metrics::Metrics;
use crate::models::Slot;
use crate::processor::SlotProcessor;
use crate::rpc::ChainClient;

pub struct TipDriver {
    chain: Arc<dyn ChainClient>,
    processor: Arc<SlotProcessor>,
    metrics: Arc<Metrics>,
}

/// Result of one tick: the new tip, and the missing-slot list carried into
/// the next tick.
struct TickOutcome {
    current_slot: Slot,
    missing: Vec<Slot>,
}

impl TipDriver {
    pub fn new(chain: Arc<dyn ChainClient>, processor: Arc<SlotProcessor>, metrics: Arc<Metrics>) -> Self {
        Self { chain, processor, metrics }
    }

    /// Run the tip-following loop until `shutdown` fires. Blocks on an
    /// initial `latest_slot()` call to establish the starting tip; failure
    /// there is fatal and is returned to the caller rather than swallowed,
    /// so the supervisor can bring the whole process down non-zero.
    pub async fn run(self, tick: std::time::Duration, mut shutdown: watch::Receiver<bool>) -> Result<(), ChainError> {
        let mut current_slot = match self.chain.latest_slot().await {
            Ok(slot) => slot,
            Err(e) => {
                tracing::error!(error = %e, "tip driver could not fetch the starting slot, aborting");
                return Err(e);
            }
        };
        tracing::info!(slot = current_slot, "tip driver starting");

        let mut missing = Vec::new();
        let mut ticker = tokio::time::interval(tick);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.advance(current_slot, missing).await;
                    current_slot = outcome.current_slot;
                    missing = outcome.missing;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn advance(&self, current_slot: Slot, mut missing: Vec<Slot>) -> TickOutcome {
        let latest = match self.chain.latest_slot().await {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch latest slot this tick");
                return TickOutcome { current_slot, missing };
            }
        };

        for slot in current_slot..=latest {
            if let Err(e) = self.processor.process(slot).await {
                tracing::warn!(slot, error = %e, "slot not yet processed this tick, queued for retry");
                self.metrics.record_missed();
                missing.push(slot);
            }
        }

        if !missing.is_empty() {
            tracing::info!(count = missing.len(), "retrying missing slots");
            let mut still_missing = Vec::with_capacity(missing.len());
            for slot in missing {
                if let Err(e) = self.processor.process(slot).await {
                    tracing::warn!(slot, error = %e, "still failed to process missing slot");
                    still_missing.push(slot);
                }
            }
            missing = still_missing;
        }

        TickOutcome { current_slot: latest.max(current_slot), missing }
    }
}
