//! Pipeline lifecycle orchestration.
//!
//! Wires the source, ingestion pipeline, sink registry, and watchdog
//! together, consumes decoded readings until a termination condition,
//! then tears everything down and reports statistics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use contracts::{HeartRateSource, RelaySettings};
use dispatcher::SinkRegistry;
use ingestion::{BackpressureConfig, DropPolicy, IngestionPipeline, MockHeartRateSource, MockSourceConfig};
use supervisor::{Watchdog, WatchdogConfig};

use super::RelayStats;

/// Pipeline configuration assembled from settings and CLI arguments
pub struct PipelineConfig {
    /// Loaded settings snapshot
    pub settings: RelaySettings,

    /// Path the settings were loaded from, polled for hot reload
    pub settings_path: PathBuf,

    /// Stop after this many dispatched readings
    pub max_readings: Option<u64>,

    /// Stop after this wall-clock duration
    pub timeout: Option<Duration>,

    /// Ingestion channel capacity
    pub buffer_size: usize,

    /// Interval between simulated notifications
    pub tickrate: Duration,

    /// Settings-file reload check interval
    pub reload_interval: Option<Duration>,
}

/// The assembled relay pipeline
pub struct RelayPipeline {
    config: PipelineConfig,
}

impl RelayPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion.
    ///
    /// Completes when `max_readings` is reached, the timeout elapses, or
    /// the reading channel closes.
    pub async fn run(self) -> Result<RelayStats> {
        let started = Instant::now();

        let registry = Arc::new(SinkRegistry::new());
        registry.rebuild(&self.config.settings);
        info!(sinks = registry.sink_count(), "Sink registry built");

        let source: Arc<MockHeartRateSource> = Arc::new(MockHeartRateSource::new(MockSourceConfig {
            tickrate: self.config.tickrate,
            loop_ramp: true,
            ..Default::default()
        }));

        let mut pipeline = IngestionPipeline::new(
            source.clone() as Arc<dyn HeartRateSource>,
            BackpressureConfig::new(self.config.buffer_size, DropPolicy::DropNewest),
        );
        let receiver = pipeline
            .take_receiver()
            .ok_or_else(|| anyhow!("ingestion receiver already taken"))?;
        let ingestion_metrics = pipeline.metrics();
        pipeline.start();

        let staleness_timeout = self.config.settings.source.disconnected_timeout();
        let watchdog = Watchdog::spawn(
            WatchdogConfig {
                timeout: staleness_timeout,
                check_interval: staleness_timeout,
            },
            source.clone() as Arc<dyn HeartRateSource>,
            Some(pipeline.reading_sender()),
        );

        // A failed first connect is recoverable, the watchdog retries it.
        if let Err(e) = source.initiate() {
            warn!(error = %e, "Initial source connection failed, supervisor will retry");
        }

        let reload_task = self.config.reload_interval.map(|interval| {
            spawn_reload_watcher(
                self.config.settings_path.clone(),
                interval,
                Arc::clone(&registry),
            )
        });

        let mut dispatched: u64 = 0;
        let mut error_readings: u64 = 0;
        let deadline = self
            .config
            .timeout
            .map(|t| tokio::time::Instant::now() + t);

        loop {
            let reading = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, receiver.recv()).await {
                        Ok(received) => received,
                        Err(_) => {
                            info!("Pipeline timeout reached");
                            break;
                        }
                    }
                }
                None => receiver.recv().await,
            };

            let reading = match reading {
                Ok(reading) => reading,
                Err(_) => {
                    info!("Reading channel closed");
                    break;
                }
            };

            if reading.is_error {
                error_readings += 1;
            } else {
                watchdog.notify_reading();
            }

            registry.dispatch(&reading);
            dispatched += 1;

            if let Some(max) = self.config.max_readings {
                if dispatched >= max {
                    info!(readings = dispatched, "Reached max readings");
                    break;
                }
            }
        }

        if let Some(task) = reload_task {
            task.abort();
        }
        watchdog.stop();
        pipeline.stop();

        Ok(RelayStats {
            readings_dispatched: dispatched,
            error_readings,
            ingestion: ingestion_metrics.snapshot(),
            duration: started.elapsed(),
            active_sinks: registry.sink_count(),
            sink_metrics: registry.metrics(),
        })
    }
}

/// Poll the settings file's mtime and rebuild the sink set on change.
///
/// In-flight dispatches finish against the previous sink set; subsequent
/// readings see the rebuilt one.
fn spawn_reload_watcher(
    path: PathBuf,
    interval: Duration,
    registry: Arc<SinkRegistry>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_modified = file_mtime(&path);
        loop {
            tokio::time::sleep(interval).await;

            let modified = file_mtime(&path);
            if modified == last_modified {
                continue;
            }
            last_modified = modified;

            match config_loader::ConfigLoader::load_from_path(&path) {
                Ok(settings) => {
                    registry.rebuild(&settings);
                    info!(
                        path = %path.display(),
                        sinks = registry.sink_count(),
                        "Settings reloaded, sink set rebuilt"
                    );
                }
                Err(e) => {
                    // Keep the previous sink set on a bad edit.
                    warn!(path = %path.display(), error = %e, "Settings reload failed");
                }
            }
        }
    })
}

fn file_mtime(path: &std::path::Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => Some(modified),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Settings file mtime unavailable");
            None
        }
    }
}
