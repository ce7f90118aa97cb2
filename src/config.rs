/// Configuration Module
///
/// Layered configuration loading: an optional key=value env file, process
/// environment variables, and CLI flags, resolved in that ascending order of
/// precedence (CLI flag wins, then env var, then config-file value, then
/// built-in default). The config file is loaded into the process environment
/// via `dotenv::from_path`, which never overwrites a variable already set —
/// so a real environment variable always wins over the file, and every
/// `std::env::var` read below already sees that merged precedence.
use std::str::FromStr;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ChainError;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub kafka_brokers: Vec<String>,
    pub kafka_topic: String,
    pub worker_count: usize,
    pub max_retries: u32,
    pub tip_interval: Duration,
    pub sweep_interval: Duration,
    pub metrics_interval: Duration,
    pub rate_limit: Duration,
    pub log_dir: String,
}

const DEFAULT_KAFKA_BROKERS: &str = "127.0.0.1:9092";
const DEFAULT_KAFKA_TOPIC: &str = "solana";
const DEFAULT_WORKER_COUNT: usize = 5;
const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_TIP_INTERVAL_SECS: u64 = 1;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
const DEFAULT_METRICS_INTERVAL_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_MS: u64 = 100;

/// Resolve one tuning knob as CLI flag > environment variable > built-in
/// default. `var_name` is looked up after the config file has been merged
/// into the process environment, so it also covers the config-file tier.
fn resolve<T: FromStr>(cli_value: Option<T>, var_name: &str, default: T) -> T {
    cli_value
        .or_else(|| std::env::var(var_name).ok().and_then(|s| s.parse().ok()))
        .unwrap_or(default)
}

impl Config {
    /// Build configuration from the env file named by `cli.config` (if it exists),
    /// the process environment, and parsed CLI flags.
    pub fn load(cli: &Cli) -> Result<Self, ChainError> {
        if std::path::Path::new(&cli.config).exists() {
            dotenv::from_path(&cli.config).ok();
        }

        let rpc_url = std::env::var("RPC_URL")
            .map_err(|_| ChainError::ConfigurationFatal("RPC_URL not set in config file or environment".into()))?;

        let kafka_brokers = std::env::var("KAFKA_BROKERS")
            .unwrap_or_else(|_| DEFAULT_KAFKA_BROKERS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let kafka_topic = std::env::var("KAFKA_TOPIC").unwrap_or_else(|_| DEFAULT_KAFKA_TOPIC.to_string());

        let worker_count = resolve(cli.worker_count, "WORKER_COUNT", DEFAULT_WORKER_COUNT);
        let max_retries = resolve(cli.max_retries, "MAX_RETRIES", DEFAULT_MAX_RETRIES);
        let tip_interval_secs = resolve(cli.tip_interval_secs, "TIP_INTERVAL_SECS", DEFAULT_TIP_INTERVAL_SECS);
        let sweep_interval_secs = resolve(cli.sweep_interval_secs, "SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
        let metrics_interval_secs =
            resolve(cli.metrics_interval_secs, "METRICS_INTERVAL_SECS", DEFAULT_METRICS_INTERVAL_SECS);
        let rate_limit_ms = resolve(cli.rate_limit_ms, "RATE_LIMIT_MS", DEFAULT_RATE_LIMIT_MS);

        Ok(Self {
            rpc_url,
            kafka_brokers,
            kafka_topic,
            worker_count,
            max_retries,
            tip_interval: Duration::from_secs(tip_interval_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            metrics_interval: Duration::from_secs(metrics_interval_secs),
            rate_limit: Duration::from_millis(rate_limit_ms),
            log_dir: cli.log_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rpc_url_is_configuration_fatal() {
        // SAFETY: test-only, no concurrent env mutation in this process's test binary for this key.
        unsafe {
            std::env::remove_var("RPC_URL");
        }
        let cli = Cli { config: "/nonexistent/path.env".into(), ..default_cli() };
        let err = Config::load(&cli).unwrap_err();
        assert!(matches!(err, ChainError::ConfigurationFatal(_)));
    }

    #[test]
    fn kafka_defaults_when_unset() {
        unsafe {
            std::env::set_var("RPC_URL", "https://example.invalid");
            std::env::remove_var("KAFKA_BROKERS");
            std::env::remove_var("KAFKA_TOPIC");
        }
        let cli = Cli { config: "/nonexistent/path.env".into(), ..default_cli() };
        let cfg = Config::load(&cli).unwrap();
        assert_eq!(cfg.kafka_brokers, vec!["127.0.0.1:9092".to_string()]);
        assert_eq!(cfg.kafka_topic, "solana");
    }

    #[test]
    fn tuning_knobs_default_when_cli_and_env_are_both_unset() {
        unsafe {
            std::env::set_var("RPC_URL", "https://example.invalid");
            std::env::remove_var("MAX_RETRIES");
            std::env::remove_var("RATE_LIMIT_MS");
        }
        let cli = Cli { config: "/nonexistent/path.env".into(), ..default_cli() };
        let cfg = Config::load(&cli).unwrap();
        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.rate_limit, Duration::from_millis(100));
    }

    #[test]
    fn environment_variable_overrides_tuning_default() {
        unsafe {
            std::env::set_var("RPC_URL", "https://example.invalid");
            std::env::set_var("MAX_RETRIES", "9");
        }
        let cli = Cli { config: "/nonexistent/path.env".into(), ..default_cli() };
        let cfg = Config::load(&cli).unwrap();
        assert_eq!(cfg.max_retries, 9);
        unsafe {
            std::env::remove_var("MAX_RETRIES");
        }
    }

    #[test]
    fn cli_flag_overrides_environment_variable() {
        unsafe {
            std::env::set_var("RPC_URL", "https://example.invalid");
            std::env::set_var("MAX_RETRIES", "9");
        }
        let cli = Cli { config: "/nonexistent/path.env".into(), max_retries: Some(20), ..default_cli() };
        let cfg = Config::load(&cli).unwrap();
        assert_eq!(cfg.max_retries, 20);
        unsafe {
            std::env::remove_var("MAX_RETRIES");
        }
    }

    fn default_cli() -> Cli {
        use clap::Parser;
        Cli::parse_from(["solana-slot-publisher"])
    }
}
