/// Logging Module
///
/// Structured logging via `tracing`, mirroring the stdout subscriber the
/// rest of this crate already uses but adding a daily-rolling file appender
/// under `log_dir` so history survives process restarts.
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize the global subscriber. The returned `WorkerGuard` must be held
/// for the lifetime of the process — dropping it stops the background
/// writer before buffered lines are flushed.
pub fn init(log_dir: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "solana_monitor.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    Ok(guard)
}
