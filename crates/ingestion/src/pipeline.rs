//! Ingestion pipeline main entry

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{HeartRateSource, Reading};
use tracing::{debug, info, trace, warn};

use crate::config::{BackpressureConfig, DropPolicy, IngestionMetrics};
use crate::decode;

/// Ingestion pipeline
///
/// Bridges a [`HeartRateSource`]'s notification callback onto a bounded
/// channel of decoded readings. Malformed buffers are counted and dropped
/// at the boundary; nothing is forwarded for them.
pub struct IngestionPipeline {
    /// Notification source
    source: Arc<dyn HeartRateSource>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Policy applied when the channel is full
    drop_policy: DropPolicy,

    /// Reading sender (cloned into the source callback and the supervisor)
    tx: Sender<Reading>,

    /// Receiver clone used to evict the oldest queued reading
    drain: Receiver<Reading>,

    /// Reading receiver
    rx: Option<Receiver<Reading>>,
}

impl IngestionPipeline {
    /// Create a new pipeline over the given source
    pub fn new(source: Arc<dyn HeartRateSource>, config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);

        Self {
            source,
            metrics: Arc::new(IngestionMetrics::new()),
            drop_policy: config.drop_policy,
            tx,
            drain: rx.clone(),
            rx: Some(rx),
        }
    }

    /// Register the decode callback on the source and begin intake.
    ///
    /// The callback runs on the source's delivery context: it decodes the
    /// payload and pushes the reading without blocking, dropping on a full
    /// channel.
    pub fn start(&self) {
        let tx = self.tx.clone();
        let drain = self.drain.clone();
        let drop_policy = self.drop_policy;
        let metrics = Arc::clone(&self.metrics);

        info!("starting notification intake");

        self.source.listen(Arc::new(move |payload| {
            let reading = match decode(&payload) {
                Some(r) => r,
                None => {
                    metrics.record_decode_error();
                    debug!(len = payload.len(), "notification buffer rejected");
                    return;
                }
            };

            metrics.record_received();
            metrics.update_queue_len(tx.len());

            match tx.try_send(reading) {
                Ok(()) => trace!("reading queued"),
                Err(TrySendError::Full(reading)) => match drop_policy {
                    DropPolicy::DropNewest => {
                        metrics.record_dropped();
                        trace!("reading dropped, channel full");
                    }
                    DropPolicy::DropOldest => {
                        // Evict the oldest queued reading to make room; a
                        // concurrent consumer recv makes the eviction moot
                        // and the retry succeed either way.
                        if drain.try_recv().is_ok() {
                            metrics.record_dropped();
                            trace!("oldest reading evicted, channel full");
                        }
                        if tx.try_send(reading).is_err() {
                            metrics.record_dropped();
                            trace!("reading dropped, channel still full");
                        }
                    }
                },
                Err(TrySendError::Closed(_)) => {
                    warn!("reading channel closed");
                }
            }
        }));
    }

    /// Stop the source and close intake
    pub fn stop(&self) {
        debug!("stopping notification intake");
        self.source.stop();
    }

    /// Get the reading stream receiver
    ///
    /// Note: can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<Reading>> {
        self.rx.take()
    }

    /// Clone the reading sender, for injecting synthesized error readings
    /// (used by the supervisor on reconnect failures)
    pub fn reading_sender(&self) -> Sender<Reading> {
        self.tx.clone()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
