/// CLI Module
///
/// Command-line interface configuration using clap. The tuning knobs below
/// are left unset (`None`) unless the flag is actually passed, so
/// `Config::load` can tell "explicitly set on the CLI" apart from "fall
/// through to the environment or the built-in default".
use clap::Parser;

/// Solana slot monitor - streams confirmed blocks to a Kafka topic
#[derive(Parser, Debug, Clone)]
#[command(name = "solana-slot-publisher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a key=value env file (defaults to `.env` if present)
    #[arg(long, value_name = "PATH", default_value = ".env")]
    pub config: String,

    /// Directory for log files (created if missing)
    #[arg(long, value_name = "DIR", default_value = "logs")]
    pub log_dir: String,

    /// Print version/build/commit information and exit
    #[arg(long)]
    pub version: bool,

    /// Number of workers reserved for future per-tick parallelization (currently unused)
    #[arg(long, value_name = "COUNT")]
    pub worker_count: Option<usize>,

    /// Maximum classification/fetch retries before a slot is abandoned for the tick
    #[arg(long, value_name = "COUNT")]
    pub max_retries: Option<u32>,

    /// Interval between tip polls, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub tip_interval_secs: Option<u64>,

    /// Interval between pending-slot sweeps, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub sweep_interval_secs: Option<u64>,

    /// Interval between metrics reports, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub metrics_interval_secs: Option<u64>,

    /// Minimum spacing between chain RPC calls, in milliseconds
    #[arg(long, value_name = "MILLIS")]
    pub rate_limit_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_with_no_args() {
        let cli = Cli::parse_from(["solana-slot-publisher"]);
        assert_eq!(cli.worker_count, None);
        assert_eq!(cli.max_retries, None);
        assert_eq!(cli.tip_interval_secs, None);
        assert_eq!(cli.sweep_interval_secs, None);
        assert_eq!(cli.metrics_interval_secs, None);
        assert_eq!(cli.rate_limit_ms, None);
        assert!(!cli.version);
    }

    #[test]
    fn overrides_are_honored() {
        let cli = Cli::parse_from(["solana-slot-publisher", "--max-retries", "8", "--rate-limit-ms", "250"]);
        assert_eq!(cli.max_retries, Some(8));
        assert_eq!(cli.rate_limit_ms, Some(250));
    }
}
