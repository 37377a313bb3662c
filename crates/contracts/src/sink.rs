//! ReadingSink trait - registry output interface
//!
//! Defines the abstract interface for sinks.

use crate::{ContractError, Reading};

/// Reading consumer trait
///
/// All sink implementations must implement this trait. A sink performs one
/// side effect per reading; a failure is isolated to that one reading and
/// must never affect other sinks.
///
/// Writes are synchronous blocking calls (file appends, UDP sends) bounded
/// by OS timeouts; none of them suspend cooperatively.
pub trait ReadingSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume one reading
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn reading(&self, reading: &Reading) -> Result<(), ContractError>;
}
