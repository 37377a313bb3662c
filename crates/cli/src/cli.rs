//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pulselink - heart-rate notification relay
#[derive(Parser, Debug)]
#[command(
    name = "pulselink",
    author,
    version,
    about = "Heart-rate notification relay",
    long_about = "Relays heart-rate measurement notifications to configured record sinks.\n\n\
                  Decodes raw GATT heart-rate measurement payloads, then fans each \n\
                  reading out to the CSV log, IBI export, raw BPM file, and UDP \n\
                  broadcast sinks. A watchdog re-initiates the source connection \n\
                  whenever readings stop arriving."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PULSELINK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PULSELINK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "pulselink.toml", env = "PULSELINK_CONFIG")]
    pub config: PathBuf,

    /// Maximum number of readings to dispatch (0 = unlimited)
    #[arg(long, default_value = "0", env = "PULSELINK_MAX_READINGS")]
    pub max_readings: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "PULSELINK_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Run against the built-in simulated source (no device transport is
    /// wired into this binary)
    #[arg(long)]
    pub mock: bool,

    /// Channel buffer size for the ingestion queue
    #[arg(long, default_value = "100", env = "PULSELINK_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Milliseconds between simulated notifications
    #[arg(long, default_value = "1000", env = "PULSELINK_TICKRATE_MS")]
    pub tickrate_ms: u64,

    /// Seconds between settings-file reload checks (0 = disabled)
    #[arg(long, default_value = "2", env = "PULSELINK_RELOAD_INTERVAL")]
    pub reload_interval: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "pulselink.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
