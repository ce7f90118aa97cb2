/// Solana Slot-to-Kafka Block Publisher
///
/// Streams confirmed Solana blocks to a durable Kafka topic: follows the
/// chain tip, classifies and fetches each slot, reshapes it into a compact
/// record, and publishes it exactly once per slot.
mod cli;
mod config;
mod error;
mod logging;
mod metrics;
mod models;
mod net_check;
mod processor;
mod publisher;
mod retry;
mod rpc;
mod supervisor;
mod sweeper;
mod tip_driver;
mod tracker;
mod transform;
mod version;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cli::Cli;

const KAFKA_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const RPC_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version::version_info());
        return Ok(());
    }

    let _log_guard = logging::init(&cli.log_dir)?;

    let config = match config::Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "fatal configuration error");
            std::process::exit(1);
        }
    };

    if let Some(first_broker) = config.kafka_brokers.first() {
        match net_check::check_tcp(first_broker, KAFKA_PROBE_TIMEOUT).await {
            Ok(()) => tracing::info!(broker = %first_broker, "Kafka connection test successful"),
            Err(e) => tracing::warn!(error = %e, "Kafka connection test failed, continuing anyway"),
        }
    }

    let chain: Arc<dyn rpc::ChainClient> =
        Arc::new(rpc::HttpChainClient::new(config.rpc_url.clone(), config.rate_limit, RPC_REQUEST_TIMEOUT)?);

    let publisher: Arc<dyn publisher::Publisher> =
        Arc::new(publisher::KafkaPublisher::new(&config.kafka_brokers, config.kafka_topic.clone())?);

    tracing::info!("Solana block monitor started");

    let mut sup = supervisor::Supervisor::start(&config, chain, publisher);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down...");
        }
        _ = terminate_signal() => {
            tracing::info!("received SIGTERM, shutting down...");
        }
        result = sup.tip_handle() => {
            // Only resolves here if the Tip Driver ended on its own before
            // we asked for shutdown, i.e. its initial tip fetch failed fatally.
            match result {
                Ok(Ok(())) => tracing::error!("tip driver exited unexpectedly without an error"),
                Ok(Err(e)) => tracing::error!(error = %e, "tip driver failed fatally"),
                Err(e) => tracing::error!(error = %e, "tip driver task panicked"),
            }
            std::process::exit(1);
        }
    }

    sup.stop().await;
    tracing::info!("shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn terminate_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    term.recv().await;
}

#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await;
}
