//! Periodic re-evaluation of every known room.
//!
//! Messages only trigger evaluation for the room they land in, so a room
//! that goes quiet after its interval elapses needs a timer to notice. The
//! scheduler ticks every `interval`, evaluates each room without a keyword
//! hit, and offers eligible rooms to the dispatch queue.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::buffer::BufferRegistry;
use crate::dispatch::{DispatchQueue, EnqueueOutcome};
use crate::trigger::TriggerThresholds;

/// Result of one scan over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Rooms evaluated.
    pub evaluated: usize,
    /// Rooms admitted to the queue.
    pub queued: usize,
    /// Eligible rooms rejected by a full queue.
    pub dropped: usize,
}

/// Evaluates every room once and queues the eligible ones.
pub fn scan(
    registry: &BufferRegistry,
    thresholds: &TriggerThresholds,
    queue: &DispatchQueue,
) -> ScanReport {
    let mut report = ScanReport::default();
    for room in registry.list_room_ids() {
        let Some(buffer) = registry.get(&room) else {
            continue;
        };
        report.evaluated += 1;
        if !buffer.should_summarize(false, thresholds) {
            continue;
        }
        match queue.try_enqueue(&room) {
            EnqueueOutcome::Queued => {
                info!(room = %room, "scheduled summary queued");
                report.queued += 1;
            }
            EnqueueOutcome::Full => {
                warn!(room = %room, "summary queue is full, skipping scheduled summary");
                report.dropped += 1;
            }
            EnqueueOutcome::Closed => {
                debug!(room = %room, "summary queue closed, skipping scheduled summary");
            }
        }
    }
    report
}

/// Handle to the running interval task.
#[derive(Debug)]
pub struct IntervalScheduler {
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalScheduler {
    /// Starts the scheduler on the current tokio runtime.
    ///
    /// Returns `None` when the interval trigger is disabled. The first scan
    /// runs one full interval after start.
    #[must_use]
    pub fn start(
        registry: Arc<BufferRegistry>,
        thresholds: Arc<TriggerThresholds>,
        queue: Arc<DispatchQueue>,
    ) -> Option<Self> {
        if !thresholds.interval_enabled() {
            return None;
        }
        let period = thresholds.interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        info!(minutes = period.as_secs() / 60, seconds = period.as_secs(), "starting interval scheduler");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        debug!("interval timer triggered");
                        let report = scan(&registry, &thresholds, &queue);
                        debug!(
                            evaluated = report.evaluated,
                            queued = report.queued,
                            dropped = report.dropped,
                            "interval scan finished"
                        );
                    }
                }
            }
            info!("interval scheduler stopped");
        });

        Some(Self {
            cancel,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Signals the task to stop. Never blocks and may be called any number
    /// of times, including after the task has exited.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once a stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the task to exit. Call [`stop`](Self::stop) first.
    pub async fn join(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "interval scheduler task ended abnormally");
        }
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
