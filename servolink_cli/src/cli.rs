//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "servolink",
    version,
    about = "Drive servos from analog sensors with self-calibrating ranges"
)]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/servolink.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop over every configured pair
    Run {
        /// Stop after this many sweeps (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        sweeps: Option<u64>,
        /// Override runner.period_ms
        #[arg(long, value_name = "MS")]
        period_ms: Option<u64>,
        /// Override runner.inter_pair_delay_ms
        #[arg(long = "delay-ms", value_name = "MS")]
        delay_ms: Option<u64>,
        /// Replay a recorded sample trace (CSV with headers channel,raw) instead of live input
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Print sweep and commit counters on completion
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Process one sensor channel repeatedly and print each result
    Probe {
        /// Analog input channel of the pair to probe
        #[arg(long, value_name = "CHANNEL")]
        channel: u8,
        /// Number of samples to take
        #[arg(long, value_name = "N", default_value_t = 1)]
        samples: u32,
        /// Replay a recorded sample trace instead of live input
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
    },
    /// Link every pair, process each once and print its state
    SelfCheck,
}
