//! Mock Relay Demo
//!
//! Wires the mock heart-rate source through the ingestion pipeline into a
//! sink set, with the watchdog supervising connection liveness. Without a
//! config path argument, sinks write into the system temp directory.
//!
//! Run with: cargo run --bin mock_relay [config_path]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{HeartRateSource, RelaySettings};
use dispatcher::SinkRegistry;
use ingestion::{BackpressureConfig, IngestionPipeline, MockHeartRateSource, MockSourceConfig};
use supervisor::{Watchdog, WatchdogConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const READINGS_TO_RELAY: u64 = 20;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => match ConfigLoader::load_from_path(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => demo_settings(),
    };

    let registry = SinkRegistry::new();
    registry.rebuild(&settings);
    info!(sinks = registry.sink_count(), "Sink set built");

    let source = Arc::new(MockHeartRateSource::new(MockSourceConfig {
        tickrate: Duration::from_millis(250),
        loop_ramp: true,
        ..Default::default()
    }));

    let mut pipeline = IngestionPipeline::new(
        source.clone() as Arc<dyn HeartRateSource>,
        BackpressureConfig::default(),
    );
    let receiver = pipeline.take_receiver().expect("fresh pipeline");
    pipeline.start();

    let watchdog = Watchdog::spawn(
        WatchdogConfig {
            timeout: settings.source.disconnected_timeout(),
            check_interval: settings.source.disconnected_timeout(),
        },
        source.clone() as Arc<dyn HeartRateSource>,
        Some(pipeline.reading_sender()),
    );

    source.initiate().expect("mock source connects");
    info!("Relaying {READINGS_TO_RELAY} readings...");

    let mut relayed = 0u64;
    while relayed < READINGS_TO_RELAY {
        let Ok(reading) = receiver.recv().await else {
            break;
        };
        if !reading.is_error {
            watchdog.notify_reading();
        }
        registry.dispatch(&reading);
        relayed += 1;
    }

    watchdog.stop();
    pipeline.stop();

    for (name, snapshot) in registry.metrics() {
        info!(
            sink = %name,
            written = snapshot.write_count,
            failed = snapshot.failure_count,
            "Sink totals"
        );
    }
    info!(relayed, "Done");
}

/// Settings pointing every file sink into the system temp directory.
fn demo_settings() -> RelaySettings {
    let dir = std::env::temp_dir().join("mock_relay");
    let _ = std::fs::create_dir_all(&dir);

    let mut settings = RelaySettings::default();
    settings.log.file = dir.join("relay %date%.csv").display().to_string();
    settings.ibi.file = dir.join("ibi.txt").display().to_string();
    settings.bpm.file = dir.join("bpm.txt").display().to_string();
    settings
}
