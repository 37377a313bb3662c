//! Pipeline statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot as SinkSnapshot;
use ingestion::MetricsSnapshot as IngestionSnapshot;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Total readings dispatched to the sink registry
    pub readings_dispatched: u64,

    /// Error readings synthesized by the supervisor
    pub error_readings: u64,

    /// Ingestion-side counters at shutdown
    pub ingestion: IngestionSnapshot,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sinks active at shutdown
    pub active_sinks: usize,

    /// Per-sink write/failure counters at shutdown
    pub sink_metrics: Vec<(String, SinkSnapshot)>,
}

impl RelayStats {
    /// Readings per second throughput
    pub fn readings_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.readings_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Relay Statistics ===\n");
        println!("Overview:");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Readings dispatched: {}", self.readings_dispatched);
        println!("  Error readings: {}", self.error_readings);
        println!("  Rate: {:.2}/s", self.readings_per_sec());

        println!("\nIngestion:");
        println!("  Received: {}", self.ingestion.readings_received);
        println!("  Dropped: {}", self.ingestion.readings_dropped);
        println!("  Decode errors: {}", self.ingestion.decode_errors);

        println!("\nSinks ({}):", self.active_sinks);
        for (name, snapshot) in &self.sink_metrics {
            println!(
                "  - {}: {} written, {} failed",
                name, snapshot.write_count, snapshot.failure_count
            );
        }

        println!();
    }
}
