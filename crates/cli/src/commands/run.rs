//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::{sink_target, RelaySettings};

use crate::cli::RunArgs;
use crate::pipeline::{PipelineConfig, RelayPipeline};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let settings = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        timeout_secs = settings.source.disconnected_timeout_secs,
        log = %settings.log.file,
        ibi = %settings.ibi.file,
        bpm = %settings.bpm.file,
        udp = %settings.udp.endpoint().unwrap_or_default(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&settings);
        return Ok(());
    }

    if !args.mock {
        anyhow::bail!(
            "no device transport is wired into this binary; pass --mock to run \
             against the simulated source"
        );
    }

    let pipeline_config = PipelineConfig {
        settings,
        settings_path: args.config.clone(),
        max_readings: if args.max_readings == 0 {
            None
        } else {
            Some(args.max_readings)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        tickrate: Duration::from_millis(args.tickrate_ms),
        reload_interval: if args.reload_interval == 0 {
            None
        } else {
            Some(Duration::from_secs(args.reload_interval))
        },
    };

    let pipeline = RelayPipeline::new(pipeline_config);

    let shutdown_signal = setup_shutdown_signal();

    info!("Starting relay pipeline...");

    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        readings = stats.readings_dispatched,
                        errors = stats.error_readings,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Pipeline completed"
                    );
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("pulselink finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(settings: &RelaySettings) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!(
        "  Disconnect timeout: {}s",
        settings.source.disconnected_timeout_secs
    );

    println!("\nSinks:");
    match sink_target(&settings.log.file) {
        Some(target) => println!(
            "  - log: {} (format: {})",
            target,
            settings.log.format
        ),
        None => println!("  - log: disabled"),
    }
    match sink_target(&settings.ibi.file) {
        Some(target) => println!("  - ibi: {}", target),
        None => println!("  - ibi: disabled"),
    }
    match sink_target(&settings.bpm.file) {
        Some(target) => println!("  - bpm: {}", target),
        None => println!("  - bpm: disabled"),
    }
    match settings.udp.endpoint() {
        Some(endpoint) => println!("  - udp: {}", endpoint),
        None => println!("  - udp: disabled"),
    }

    println!();
}
