//! Pipeline orchestration.
//!
//! [`Scribe`] owns the room registry, the dispatch queue, the summary worker
//! and the interval scheduler. Callers feed it messages with
//! [`Scribe::ingest`]; rooms that cross a trigger are queued and summarized
//! in the background.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::buffer::{AddOutcome, BufferRegistry};
use crate::config::Config;
use crate::core::{Message, Snapshot};
use crate::dispatch::{DispatchQueue, DispatchReceiver, EnqueueOutcome, SummaryWorker, WorkerStats};
use crate::error::{Error, Result};
use crate::ingest::ChatEvent;
use crate::scheduler::IntervalScheduler;
use crate::summarize::{Summarizer, SummarySink};
use crate::trigger::{Decision, TriggerReason, TriggerThresholds};

/// What [`Scribe::ingest`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The room is not in the target list.
    RoomFiltered,
    /// The content was empty or whitespace.
    Blank,
    /// The id is already buffered.
    Duplicate,
    /// Buffered; no trigger fired.
    Buffered,
    /// Buffered and a trigger fired.
    Triggered {
        /// Trigger that fired.
        reason: TriggerReason,
        /// Whether the queue admitted the room.
        enqueue: EnqueueOutcome,
    },
}

impl IngestOutcome {
    /// Returns `true` if the message is now held by a room buffer.
    #[must_use]
    pub const fn is_buffered(&self) -> bool {
        matches!(self, Self::Buffered | Self::Triggered { .. })
    }
}

/// Chat accumulator and summary dispatcher.
pub struct Scribe {
    config: Config,
    registry: Arc<BufferRegistry>,
    thresholds: Arc<TriggerThresholds>,
    queue: Arc<DispatchQueue>,
    receiver: Mutex<Option<DispatchReceiver>>,
    summarizer: Arc<dyn Summarizer>,
    sink: Arc<dyn SummarySink>,
    cancel: CancellationToken,
    scheduler: Mutex<Option<IntervalScheduler>>,
    worker: Mutex<Option<JoinHandle<WorkerStats>>>,
    stopped: AtomicBool,
}

impl std::fmt::Debug for Scribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scribe")
            .field("rooms", &self.registry.len())
            .field("queued", &self.queue.len())
            .field("summarizer", &self.summarizer.name())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl Scribe {
    /// Builds the pipeline. Nothing runs until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(
        config: Config,
        summarizer: Arc<dyn Summarizer>,
        sink: Arc<dyn SummarySink>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(BufferRegistry::new(config.buffer_capacity));
        let thresholds = Arc::new(config.triggers.clone());
        let (queue, receiver) = DispatchQueue::new(config.queue_capacity);

        Ok(Self {
            config,
            registry,
            thresholds,
            queue: Arc::new(queue),
            receiver: Mutex::new(Some(receiver)),
            summarizer,
            sink,
            cancel: CancellationToken::new(),
            scheduler: Mutex::new(None),
            worker: Mutex::new(None),
            stopped: AtomicBool::new(false),
        })
    }

    /// Spawns the summary worker and, when the interval trigger is enabled,
    /// the interval scheduler. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the pipeline was already started.
    pub fn start(&self) -> Result<()> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| Error::InvalidState {
                message: "pipeline already started".to_string(),
            })?;

        let worker = SummaryWorker::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.summarizer),
            Arc::clone(&self.sink),
            self.cancel.clone(),
        );
        let handle = tokio::spawn(worker.run(receiver));
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        let scheduler = IntervalScheduler::start(
            Arc::clone(&self.registry),
            Arc::clone(&self.thresholds),
            Arc::clone(&self.queue),
        );
        if scheduler.is_none() {
            info!("interval trigger disabled, scheduler not started");
        }
        *self.scheduler.lock().unwrap_or_else(PoisonError::into_inner) = scheduler;
        Ok(())
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Room registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<BufferRegistry> {
        &self.registry
    }

    /// Dispatch queue fed by triggers.
    #[must_use]
    pub const fn queue(&self) -> &Arc<DispatchQueue> {
        &self.queue
    }

    /// Buffers a decoded chat event. See [`ingest`](Self::ingest).
    pub fn ingest_event(&self, event: ChatEvent) -> IngestOutcome {
        self.ingest(event.into_message())
    }

    /// Filters, buffers and evaluates one message.
    ///
    /// Messages for rooms outside the target list and messages with blank
    /// content are dropped. A buffered message is checked for the keyword
    /// and its room evaluated; a room that fires is offered to the queue
    /// without blocking.
    pub fn ingest(&self, message: Message) -> IngestOutcome {
        if !self.config.accepts_room(message.room()) {
            debug!(room = %message.room(), "room not targeted, message ignored");
            return IngestOutcome::RoomFiltered;
        }
        if message.is_blank() {
            return IngestOutcome::Blank;
        }

        let keyword_hit = self.thresholds.keyword_hit(message.content());
        let buffer = self.registry.get_or_create(message.room());
        if buffer.add(message).is_duplicate() {
            return IngestOutcome::Duplicate;
        }

        match buffer.evaluate(keyword_hit, &self.thresholds, Instant::now()) {
            Decision::Fire(reason) => IngestOutcome::Triggered {
                reason,
                enqueue: self.enqueue(buffer.room()),
            },
            Decision::BelowFloor { .. } | Decision::Idle => IngestOutcome::Buffered,
        }
    }

    /// Adds a message to its room without filtering or evaluation.
    pub fn add(&self, message: Message) -> AddOutcome {
        self.registry.add(message)
    }

    /// Rooms seen so far.
    #[must_use]
    pub fn list_room_ids(&self) -> Vec<String> {
        self.registry.list_room_ids()
    }

    /// Empties a room's buffer. Returns the number of messages dropped.
    pub fn clear(&self, room: &str) -> usize {
        self.registry.clear(room)
    }

    /// Exports a room's buffered messages.
    #[must_use]
    pub fn snapshot(&self, room: &str) -> Snapshot {
        self.registry.snapshot(room)
    }

    /// Evaluates every room as if the keyword had been seen and queues the
    /// eligible ones. The minimum message floor still applies.
    ///
    /// Returns the number of rooms queued.
    pub fn flush(&self) -> usize {
        let now = Instant::now();
        let mut queued = 0;
        for room in self.registry.list_room_ids() {
            let Some(buffer) = self.registry.get(&room) else {
                continue;
            };
            if buffer.evaluate(true, &self.thresholds, now).should_summarize()
                && self.enqueue(&room).is_queued()
            {
                queued += 1;
            }
        }
        info!(queued, "flushed rooms");
        queued
    }

    fn enqueue(&self, room: &str) -> EnqueueOutcome {
        let outcome = self.queue.try_enqueue(room);
        match outcome {
            EnqueueOutcome::Queued => debug!(room = %room, "summary request queued"),
            EnqueueOutcome::Full => {
                warn!(room = %room, "summary queue is full, dropping request");
            }
            EnqueueOutcome::Closed => {
                debug!(room = %room, "summary queue closed, request ignored");
            }
        }
        outcome
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Shuts the pipeline down without waiting.
    ///
    /// Stops the scheduler, closes the queue and cancels any in-flight
    /// summarization. Rooms whose summary is cancelled keep their buffers.
    /// Safe to call any number of times.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("stopping summary pipeline");
        self.cancel.cancel();
        self.stop_scheduler();
        self.queue.close();
    }

    /// Stops accepting work and waits for queued rooms to be summarized.
    ///
    /// Unlike [`stop`](Self::stop), nothing is cancelled.
    pub async fn finish(&self) -> WorkerStats {
        self.stop_scheduler();
        let scheduler = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(scheduler) = scheduler {
            scheduler.join().await;
        }
        self.queue.close();
        self.join().await
    }

    /// Waits for the worker to exit and returns its counters.
    ///
    /// Returns default counters if the worker was never started or has
    /// already been joined.
    pub async fn join(&self) -> WorkerStats {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(handle) => match handle.await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(error = %e, "summary worker ended abnormally");
                    WorkerStats::default()
                }
            },
            None => WorkerStats::default(),
        }
    }

    fn stop_scheduler(&self) {
        if let Some(scheduler) = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            scheduler.stop();
        }
    }
}

impl Drop for Scribe {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::{Delivery, DigestSummarizer};
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Default)]
    struct VecSink(Mutex<Vec<Delivery>>);

    #[async_trait]
    impl SummarySink for VecSink {
        async fn deliver(
            &self,
            delivery: &Delivery,
        ) -> std::result::Result<(), crate::error::SummarizeError> {
            self.0.lock().unwrap().push(delivery.clone());
            Ok(())
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.buffer_capacity = 3;
        config.triggers = TriggerThresholds {
            min_messages_for_summary: 2,
            message_count_threshold: 3,
            interval: Duration::ZERO,
            keyword: "@bot summary".to_string(),
        };
        config
    }

    fn scribe(config: Config) -> (Scribe, Arc<VecSink>) {
        let sink = Arc::new(VecSink::default());
        let scribe = Scribe::new(
            config,
            Arc::new(DigestSummarizer::new()),
            Arc::clone(&sink) as Arc<dyn SummarySink>,
        )
        .unwrap();
        (scribe, sink)
    }

    #[test]
    fn test_ingest_filters() {
        let mut config = config();
        config.target_rooms = vec!["ops".to_string()];
        let (scribe, _sink) = scribe(config);

        let outcome = scribe.ingest(Message::new("1", "a", "hi", "random"));
        assert_eq!(outcome, IngestOutcome::RoomFiltered);
        let outcome = scribe.ingest(Message::new("2", "a", "   ", "ops"));
        assert_eq!(outcome, IngestOutcome::Blank);
        assert!(scribe.list_room_ids().is_empty());

        assert!(scribe.ingest(Message::new("3", "a", "hi", "ops")).is_buffered());
        assert_eq!(
            scribe.ingest(Message::new("3", "a", "hi", "ops")),
            IngestOutcome::Duplicate
        );
        assert_eq!(scribe.list_room_ids(), vec!["ops".to_string()]);
    }

    #[test]
    fn test_ingest_triggers_on_volume_and_keyword() {
        let (scribe, _sink) = scribe(config());

        assert_eq!(
            scribe.ingest(Message::new("1", "a", "x", "r")),
            IngestOutcome::Buffered
        );
        let outcome = scribe.ingest(Message::new("2", "b", "@bot summary please", "r"));
        assert_eq!(
            outcome,
            IngestOutcome::Triggered {
                reason: TriggerReason::Keyword,
                enqueue: EnqueueOutcome::Queued,
            }
        );
        let outcome = scribe.ingest(Message::new("3", "c", "z", "r"));
        assert!(matches!(
            outcome,
            IngestOutcome::Triggered {
                reason: TriggerReason::MessageCount { count: 3, threshold: 3 },
                ..
            }
        ));
        assert_eq!(scribe.queue().len(), 2);
    }

    #[test]
    fn test_keyword_below_floor_does_not_trigger() {
        let (scribe, _sink) = scribe(config());
        let outcome = scribe.ingest(Message::new("1", "a", "@bot summary", "r"));
        assert_eq!(outcome, IngestOutcome::Buffered);
        assert!(scribe.queue().is_empty());
    }

    #[test]
    fn test_full_queue_keeps_buffers() {
        let mut config = config();
        config.queue_capacity = 1;
        let (scribe, _sink) = scribe(config);

        for room in ["a", "b"] {
            for i in 0..3 {
                let _ = scribe.ingest(Message::new(format!("{room}{i}"), "u", "m", room));
            }
        }
        assert_eq!(scribe.queue().len(), 1);
        assert_eq!(scribe.queue().dropped(), 1);
        assert_eq!(scribe.snapshot("a").count, 3);
        assert_eq!(scribe.snapshot("b").count, 3);
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let (scribe, _sink) = scribe(config());
            scribe.start().unwrap();
            assert!(matches!(scribe.start(), Err(Error::InvalidState { .. })));
            scribe.stop();
            let _ = scribe.join().await;
        });
    }

    #[tokio::test]
    async fn test_finish_summarizes_queued_rooms() {
        let (scribe, sink) = scribe(config());
        scribe.start().unwrap();
        for i in 0..3 {
            let _ = scribe.ingest(Message::new(i.to_string(), "alice", "hello", "ops"));
        }

        let stats = scribe.finish().await;
        assert_eq!(stats.summarized, 1);
        assert!(scribe.snapshot("ops").is_empty());

        let deliveries = sink.0.lock().unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].room(), "ops");
    }

    #[tokio::test]
    async fn test_flush_honors_floor() {
        let (scribe, sink) = scribe(config());
        scribe.start().unwrap();
        let _ = scribe.ingest(Message::new("1", "a", "x", "lonely"));
        let _ = scribe.ingest(Message::new("2", "a", "x", "pair"));
        let _ = scribe.ingest(Message::new("3", "b", "y", "pair"));

        assert_eq!(scribe.flush(), 1);
        let stats = scribe.finish().await;
        assert_eq!(stats.summarized, 1);
        assert_eq!(scribe.snapshot("lonely").count, 1);
        assert_eq!(sink.0.lock().unwrap()[0].room(), "pair");
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (scribe, _sink) = scribe(config());
        scribe.start().unwrap();
        scribe.stop();
        scribe.stop();
        assert!(scribe.is_stopped());
        assert!(scribe.queue().is_closed());
        let _ = scribe.join().await;
        let _ = scribe.join().await;
        scribe.stop();
    }
}
