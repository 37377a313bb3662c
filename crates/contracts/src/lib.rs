//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Flow
//! Source → raw notification bytes → decoder → [`Reading`] → sink registry → sinks.
//! The supervisor only observes reading arrival times, never reading content.

mod error;
mod reading;
mod settings;
mod sink;
mod source;

pub use error::*;
pub use reading::*;
pub use settings::*;
pub use sink::ReadingSink;
pub use source::{HeartRateSource, NotificationCallback};
