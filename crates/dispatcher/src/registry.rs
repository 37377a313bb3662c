//! SinkRegistry - atomic fan-out to the active sink set

use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDateTime};
use contracts::{Reading, ReadingSink, RelaySettings};
use tracing::{error, info, trace, warn};

use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{BpmFileSink, IbiSink, LogFileSink, UdpSink};

struct SinkEntry {
    sink: Box<dyn ReadingSink>,
    metrics: Arc<SinkMetrics>,
}

impl SinkEntry {
    fn new(sink: Box<dyn ReadingSink>) -> Self {
        Self {
            sink,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }
}

/// Owns the active set of configured sinks and fans each reading out to all
/// of them.
///
/// `rebuild` constructs a fresh set from a settings snapshot and swaps it in
/// atomically; a `dispatch` already in progress finishes against whichever
/// snapshot it observed, and the previous set's resources (the UDP socket)
/// are released only once the last such dispatch drops its reference.
pub struct SinkRegistry {
    active: RwLock<Arc<Vec<SinkEntry>>>,
    started_at: NaiveDateTime,
}

impl SinkRegistry {
    /// Create an empty registry; `%date%` path tokens resolve against now
    pub fn new() -> Self {
        Self::with_start_time(Local::now().naive_local())
    }

    /// Create with an explicit start instant for path token resolution
    pub fn with_start_time(started_at: NaiveDateTime) -> Self {
        Self {
            active: RwLock::new(Arc::new(Vec::new())),
            started_at,
        }
    }

    /// Rebuild the sink set from a settings snapshot and swap it in.
    ///
    /// Each sink validates its own target; one that fails to configure
    /// (bad endpoint, blank path) becomes a no-op without affecting the
    /// others or failing the rebuild.
    pub fn rebuild(&self, settings: &RelaySettings) {
        let entries = vec![
            SinkEntry::new(Box::new(LogFileSink::from_settings(
                settings,
                self.started_at,
            ))),
            SinkEntry::new(Box::new(IbiSink::from_settings(settings, self.started_at))),
            SinkEntry::new(Box::new(BpmFileSink::from_settings(
                settings,
                self.started_at,
            ))),
            SinkEntry::new(Box::new(UdpSink::from_settings(settings))),
        ];

        let fresh = Arc::new(entries);
        let previous = {
            let mut guard = self.active.write().expect("sink registry lock");
            std::mem::replace(&mut *guard, fresh)
        };

        info!(sinks = self.sink_count(), "sink set rebuilt");
        // Previous snapshot's resources close here unless a dispatch still
        // holds it, in which case they close when that dispatch finishes.
        drop(previous);
    }

    /// Install an explicit sink set (tests)
    pub fn install_sinks(&self, sinks: Vec<Box<dyn ReadingSink>>) {
        let entries = sinks.into_iter().map(SinkEntry::new).collect();
        *self.active.write().expect("sink registry lock") = Arc::new(entries);
    }

    /// Deliver one reading to every active sink.
    ///
    /// A fault in one sink is logged and skipped for this reading only; the
    /// sink stays enabled and the remaining sinks still receive the reading.
    pub fn dispatch(&self, reading: &Reading) {
        if reading.is_error {
            warn!(
                message = reading.error_message.as_deref().unwrap_or("unknown"),
                "error reading received"
            );
        } else {
            trace!(
                bpm = reading.beats_per_minute,
                status = %reading.status,
                rr = reading.rr_intervals.len(),
                "dispatching reading"
            );
        }

        let snapshot = self.active.read().expect("sink registry lock").clone();

        for entry in snapshot.iter() {
            match entry.sink.reading(reading) {
                Ok(()) => entry.metrics.inc_write_count(),
                Err(e) => {
                    entry.metrics.inc_failure_count();
                    error!(sink = entry.sink.name(), error = %e, "sink write failed, reading skipped");
                }
            }
        }
    }

    /// Number of sinks in the active set
    pub fn sink_count(&self) -> usize {
        self.active.read().expect("sink registry lock").len()
    }

    /// Per-sink metrics snapshots
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.active
            .read()
            .expect("sink registry lock")
            .iter()
            .map(|entry| (entry.sink.name().to_string(), entry.metrics.snapshot()))
            .collect()
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
