//! HeartRateSource trait - notification transport abstraction
//!
//! Defines a unified interface for the GATT-style transport that discovers
//! the physical device and delivers raw notification buffers. Both the real
//! transport and the mock source used in tests implement this trait.

use std::sync::Arc;

use bytes::Bytes;

use crate::ContractError;

/// Notification callback type
///
/// When the device pushes a measurement, the source delivers the raw payload
/// through this callback. Uses `Arc` to allow callback sharing across
/// multiple contexts.
pub type NotificationCallback = Arc<dyn Fn(Bytes) + Send + Sync>;

/// Heart-rate notification source trait
///
/// Abstracts the transport boundary: the supervisor drives `initiate` to
/// (re)establish the subscription, the ingestion pipeline registers the
/// notification callback via `listen`.
pub trait HeartRateSource: Send + Sync {
    /// Establish or refresh the device subscription.
    ///
    /// Blocking; returns once the subscription is active or fails. A failure
    /// is recoverable, the caller may retry.
    ///
    /// # Errors
    /// [`ContractError::SourceConnection`] when the device is unreachable and
    /// [`ContractError::SourceDisposed`] after disposal.
    fn initiate(&self) -> Result<(), ContractError>;

    /// Register the notification callback.
    ///
    /// Invoked once per raw payload on the source's own execution context.
    /// Repeated calls replace the previous callback.
    fn listen(&self, callback: NotificationCallback);

    /// Stop delivering notifications and release the subscription.
    fn stop(&self);

    /// Whether the source has been disposed; once true, the supervisor
    /// stops driving it.
    fn is_disposed(&self) -> bool;
}
