//! # Dispatcher
//!
//! Reading fan-out module.
//!
//! Responsible for:
//! - Rendering readings as CSV rows (with the legacy escaping rules)
//! - The four record sinks: CSV log, IBI export, raw BPM file, UDP broadcast
//! - The sink registry: atomic snapshot swap on settings reload, per-sink
//!   failure isolation at dispatch time

pub mod csv;
pub mod metrics;
pub mod registry;
pub mod sinks;
pub mod timefmt;

pub use contracts::{Reading, ReadingSink};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use registry::SinkRegistry;
pub use sinks::{BpmFileSink, IbiSink, LogFileSink, UdpSink};
