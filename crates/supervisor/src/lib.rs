//! # Supervisor
//!
//! Connection liveness watchdog.
//!
//! Responsible for:
//! - Observing reading arrival times (never reading content)
//! - Driving the source's re-initiate operation on staleness
//! - Never letting a transport failure escape past its boundary

mod watchdog;

pub use watchdog::{Watchdog, WatchdogConfig};
