//! Connection watchdog
//!
//! A dedicated background thread runs a sleep-then-check loop: when no
//! reading has arrived within the configured timeout it synchronously
//! re-initiates the source, at most once per check interval. Reconnect
//! failures are logged and retried on the next tick; nothing here is fatal
//! to the host process.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use async_channel::Sender;
use contracts::{HeartRateSource, Reading};
use tracing::{debug, info, warn};

/// Granularity of the stop-flag poll inside one check interval
const STOP_POLL_SLICE: Duration = Duration::from_millis(100);

/// Watchdog configuration
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// Silence longer than this marks the link stale
    pub timeout: Duration,

    /// Interval between staleness checks
    pub check_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            check_interval: Duration::from_secs(10),
        }
    }
}

/// Timer state shared between the loop thread and reading arrivals.
///
/// One mutex guards both fields so a reconnect decision is never made
/// against a half-updated timestamp.
struct WatchdogState {
    last_reading_at: Instant,
    /// Set once, never reset
    stopped: bool,
}

/// Connection supervisor
///
/// Construction starts the background loop. The normal reading pipeline
/// calls [`Watchdog::notify_reading`] on every successful reading, which
/// keeps the link marked live without the watchdog having to notice the
/// recovery explicitly.
pub struct Watchdog {
    state: Arc<Mutex<WatchdogState>>,
}

impl Watchdog {
    /// Start supervising the given source.
    ///
    /// `error_tx`, when set, receives a synthesized error reading for each
    /// failed reconnect attempt so the pipeline can log it.
    pub fn spawn(
        config: WatchdogConfig,
        source: Arc<dyn HeartRateSource>,
        error_tx: Option<Sender<Reading>>,
    ) -> Self {
        let state = Arc::new(Mutex::new(WatchdogState {
            last_reading_at: Instant::now(),
            stopped: false,
        }));

        let loop_state = Arc::clone(&state);
        thread::Builder::new()
            .name("watchdog".to_string())
            .spawn(move || watchdog_loop(config, loop_state, source, error_tx))
            .expect("spawn watchdog thread");

        Self { state }
    }

    /// Record a successful reading arrival, resetting the staleness clock
    pub fn notify_reading(&self) {
        let mut state = self.state.lock().expect("watchdog lock");
        if !state.stopped {
            state.last_reading_at = Instant::now();
        }
    }

    /// Request termination; the loop observes the flag at the top of its
    /// next iteration. Terminal and irreversible.
    pub fn stop(&self) {
        self.state.lock().expect("watchdog lock").stopped = true;
    }

    /// Whether `stop` has been requested
    pub fn is_stopped(&self) -> bool {
        self.state.lock().expect("watchdog lock").stopped
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watchdog_loop(
    config: WatchdogConfig,
    state: Arc<Mutex<WatchdogState>>,
    source: Arc<dyn HeartRateSource>,
    error_tx: Option<Sender<Reading>>,
) {
    debug!(
        timeout_ms = config.timeout.as_millis() as u64,
        check_interval_ms = config.check_interval.as_millis() as u64,
        "watchdog started"
    );

    loop {
        let needs_refresh = {
            let guard = state.lock().expect("watchdog lock");
            if guard.stopped {
                break;
            }
            guard.last_reading_at.elapsed() > config.timeout
        };

        if source.is_disposed() {
            debug!("source disposed, watchdog exiting");
            break;
        }

        if needs_refresh {
            info!("no readings within timeout, restarting subscription");
            match source.initiate() {
                Ok(()) => {
                    // A successful reconnect resets the staleness clock even
                    // before the first reading arrives, so the next check
                    // does not immediately retry.
                    state
                        .lock()
                        .expect("watchdog lock")
                        .last_reading_at = Instant::now();
                    info!("subscription restarted");
                }
                Err(e) => {
                    warn!(error = %e, "restart failed, will retry");
                    if let Some(tx) = &error_tx {
                        let _ = tx.try_send(Reading::error(format!("Reconnect failed: {e}")));
                    }
                }
            }
        }

        if !sleep_unless_stopped(&state, config.check_interval) {
            break;
        }
    }

    debug!("watchdog thread exiting");
}

/// Sleep for the check interval in short slices, bailing out early when the
/// stop flag is raised. Returns false when stopped.
fn sleep_unless_stopped(state: &Mutex<WatchdogState>, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if state.lock().expect("watchdog lock").stopped {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(STOP_POLL_SLICE.min(deadline - now));
    }
}
