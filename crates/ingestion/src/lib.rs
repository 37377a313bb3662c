//! # Ingestion
//!
//! Notification intake module.
//!
//! Responsibilities:
//! - Decode raw GATT heart-rate measurement payloads into [`contracts::Reading`]
//! - Bridge the source's callback context onto a bounded channel
//! - Drop malformed samples locally, count them, never propagate

pub mod config;
pub mod decode;
pub mod mock;
pub mod pipeline;

pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use decode::decode;
pub use mock::{encode_notification, MockSourceConfig, MockHeartRateSource};
pub use pipeline::IngestionPipeline;
