//! Pipeline orchestration and lifecycle management.

mod orchestrator;
mod stats;

pub use orchestrator::{PipelineConfig, RelayPipeline};
pub use stats::RelayStats;
