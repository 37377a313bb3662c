//! Mock heart-rate source
//!
//! Timer-driven source for tests and mock-mode runs. Emits a fixed BPM ramp
//! encoded as real notification payloads, the same bytes a device would push.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContactStatus, ContractError, HeartRateSource, NotificationCallback};
use tracing::{debug, trace};

/// Encode one heart-rate measurement payload.
///
/// Uses the 8-bit BPM form when the value fits, the 16-bit form otherwise,
/// with the contact status in flag bits 1-2.
pub fn encode_notification(status: ContactStatus, bpm: u16) -> Bytes {
    let status_bits = (status as u8) << 1;

    if bpm <= u8::MAX as u16 {
        Bytes::from(vec![status_bits, bpm as u8])
    } else {
        let [lo, hi] = bpm.to_le_bytes();
        Bytes::from(vec![status_bits | 0b1, lo, hi])
    }
}

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Interval between emitted notifications
    pub tickrate: Duration,

    /// BPM values to emit, in order
    pub bpm_ramp: Vec<u16>,

    /// Restart the ramp when exhausted instead of going quiet
    pub loop_ramp: bool,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            tickrate: Duration::from_secs(1),
            bpm_ramp: vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 99],
            loop_ramp: false,
        }
    }
}

/// Mock heart-rate source
///
/// `initiate` starts an emitter thread delivering encoded payloads through
/// the registered callback at the configured tickrate, on its own execution
/// context like a real transport would.
pub struct MockHeartRateSource {
    config: MockSourceConfig,
    callback: Mutex<Option<NotificationCallback>>,
    running: Arc<AtomicBool>,
    disposed: AtomicBool,
}

impl Default for MockHeartRateSource {
    fn default() -> Self {
        Self::new(MockSourceConfig::default())
    }
}

impl MockHeartRateSource {
    /// Create a new mock source
    pub fn new(config: MockSourceConfig) -> Self {
        Self {
            config,
            callback: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            disposed: AtomicBool::new(false),
        }
    }

    /// Deliver one raw buffer directly through the callback, bypassing the
    /// emitter thread. Test hook for malformed payloads.
    pub fn push_raw(&self, buffer: &[u8]) {
        if let Some(cb) = self.callback.lock().expect("callback lock").clone() {
            cb(Bytes::copy_from_slice(buffer));
        }
    }

    /// Mark the source disposed; `initiate` fails afterwards
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.stop();
    }

    fn current_callback(&self) -> Option<NotificationCallback> {
        self.callback.lock().expect("callback lock").clone()
    }
}

impl HeartRateSource for MockHeartRateSource {
    fn initiate(&self) -> Result<(), ContractError> {
        if self.is_disposed() {
            return Err(ContractError::SourceDisposed);
        }

        if self.running.swap(true, Ordering::SeqCst) {
            // Already emitting; a refresh is a no-op.
            return Ok(());
        }

        let config = self.config.clone();
        let running = Arc::clone(&self.running);
        let callback = self.current_callback();

        debug!(
            tickrate_ms = config.tickrate.as_millis() as u64,
            samples = config.bpm_ramp.len(),
            "mock source started"
        );

        thread::spawn(move || {
            'ramp: loop {
                for &bpm in &config.bpm_ramp {
                    thread::sleep(config.tickrate);

                    if !running.load(Ordering::Relaxed) {
                        break 'ramp;
                    }

                    if let Some(cb) = callback.as_ref() {
                        trace!(bpm, "mock notification");
                        cb(encode_notification(ContactStatus::Contact, bpm));
                    }
                }

                if !config.loop_ramp {
                    break;
                }
            }

            debug!("mock source emitter exiting");
        });

        Ok(())
    }

    fn listen(&self, callback: NotificationCallback) {
        *self.callback.lock().expect("callback lock") = Some(callback);
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("mock source stopped");
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Relaxed)
    }
}
