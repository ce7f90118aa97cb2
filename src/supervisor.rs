/// Supervisor Module
///
/// Spawns the Tip Driver, Retry Sweeper, and Metrics Reporter as independent
/// tasks sharing one shutdown signal, and joins them on `stop`.
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::ChainError;
use crate::metrics::{self, Metrics};
use crate::processor::SlotProcessor;
use crate::publisher::Publisher;
use crate::retry::RetryPolicy;
use crate::rpc::ChainClient;
use crate::sweeper::RetrySweeper;
use crate::tip_driver::TipDriver;
use crate::tracker::SlotTracker;

pub struct Supervisor {
    shutdown_tx: watch::Sender<bool>,
    tip_handle: JoinHandle<Result<(), ChainError>>,
    handles: Vec<JoinHandle<()>>,
}

impl Supervisor {
    pub fn start(config: &Config, chain: Arc<dyn ChainClient>, publisher: Arc<dyn Publisher>) -> Self {
        let tracker = Arc::new(SlotTracker::new(config.max_retries));
        let metrics = Arc::new(Metrics::new());
        let processor = Arc::new(SlotProcessor::new(
            chain.clone(),
            publisher,
            tracker.clone(),
            metrics.clone(),
            RetryPolicy::with_max_retries(config.max_retries),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tip_driver = TipDriver::new(chain, processor.clone(), metrics.clone());
        let tip_handle = tokio::spawn(tip_driver.run(config.tip_interval, shutdown_rx.clone()));

        let sweeper = RetrySweeper::new(processor, tracker.clone());
        let sweep_handle = tokio::spawn(sweeper.run(config.sweep_interval, shutdown_rx.clone()));

        let reporter_handle = metrics::spawn_reporter(metrics, tracker, config.metrics_interval, shutdown_rx);

        Self { shutdown_tx, tip_handle, handles: vec![sweep_handle, reporter_handle] }
    }

    /// The Tip Driver's join handle, for the caller to select on alongside
    /// shutdown signals: if it resolves before `stop` is called, the Tip
    /// Driver ended on its own (fatally, since normal shutdown only happens
    /// after `stop` sends the signal it's waiting on).
    pub fn tip_handle(&mut self) -> &mut JoinHandle<Result<(), ChainError>> {
        &mut self.tip_handle
    }

    /// Signal every task to stop and wait for them to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);

        match self.tip_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "tip driver exited with an error during shutdown"),
            Err(e) => tracing::warn!(error = %e, "tip driver task panicked during shutdown"),
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "supervised task panicked during shutdown");
            }
        }
    }
}
