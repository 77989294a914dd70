//! The single consumer of the dispatch queue.
//!
//! Rooms are processed one at a time: snapshot, summarize, deliver, and
//! clear only after a successful delivery. A failed or cancelled attempt
//! leaves the buffer as it was so the same messages are summarized on the
//! next trigger.

use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::queue::DispatchReceiver;
use crate::buffer::BufferRegistry;
use crate::summarize::{Delivery, Summarizer, SummarySink, render_report};

/// What happened to one dequeued room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Summary delivered and buffer cleared.
    Summarized,
    /// Nothing buffered; no summary produced.
    Empty,
    /// The summarizer failed; buffer kept.
    Failed,
    /// Shutdown interrupted the attempt; buffer kept.
    Cancelled,
    /// Summary produced but the sink rejected it; buffer kept.
    Undelivered,
}

/// Per-outcome counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Rooms summarized and cleared.
    pub summarized: usize,
    /// Rooms dequeued with an empty buffer.
    pub empty: usize,
    /// Summarizer failures.
    pub failed: usize,
    /// Cancelled attempts.
    pub cancelled: usize,
    /// Summaries the sink rejected.
    pub undelivered: usize,
}

impl WorkerStats {
    /// Counts one outcome.
    pub const fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Summarized => self.summarized += 1,
            Outcome::Empty => self.empty += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Cancelled => self.cancelled += 1,
            Outcome::Undelivered => self.undelivered += 1,
        }
    }

    /// Rooms processed in total.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.summarized + self.empty + self.failed + self.cancelled + self.undelivered
    }
}

/// Serial summary worker.
pub struct SummaryWorker {
    registry: Arc<BufferRegistry>,
    summarizer: Arc<dyn Summarizer>,
    sink: Arc<dyn SummarySink>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for SummaryWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryWorker")
            .field("summarizer", &self.summarizer.name())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl SummaryWorker {
    /// Creates a worker. `cancel` aborts in-flight summarization.
    #[must_use]
    pub fn new(
        registry: Arc<BufferRegistry>,
        summarizer: Arc<dyn Summarizer>,
        sink: Arc<dyn SummarySink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            summarizer,
            sink,
            cancel,
        }
    }

    /// Consumes rooms until the queue is closed and drained.
    pub async fn run(self, mut receiver: DispatchReceiver) -> WorkerStats {
        info!(summarizer = self.summarizer.name(), "summary worker started");
        let mut stats = WorkerStats::default();
        while let Some(room) = receiver.recv().await {
            stats.record(self.process(&room).await);
        }
        info!(
            summarized = stats.summarized,
            failed = stats.failed,
            cancelled = stats.cancelled,
            "summary worker stopped"
        );
        stats
    }

    /// Summarizes one room.
    pub async fn process(&self, room: &str) -> Outcome {
        let Some(buffer) = self.registry.get(room) else {
            debug!(room = %room, "unknown room dequeued");
            return Outcome::Empty;
        };
        let snapshot = buffer.snapshot();
        if snapshot.is_empty() {
            debug!(room = %room, "no new messages to summarize");
            return Outcome::Empty;
        }
        if self.cancel.is_cancelled() {
            info!(room = %room, "shutting down, summary skipped");
            return Outcome::Cancelled;
        }

        info!(
            room = %room,
            count = snapshot.count,
            participants = snapshot.participant_count(),
            "generating summary"
        );
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(crate::error::SummarizeError::Cancelled),
            result = self.summarizer.summarize(&snapshot, &self.cancel) => result,
        };

        match result {
            Ok(body) => {
                let delivery = Delivery::Summary {
                    room: room.to_string(),
                    text: render_report(&snapshot, &body, Local::now()),
                    message_count: snapshot.count,
                    participant_count: snapshot.participant_count(),
                };
                match self.sink.deliver(&delivery).await {
                    Ok(()) => {
                        let _ = buffer.clear();
                        info!(room = %room, "summary delivered");
                        Outcome::Summarized
                    }
                    Err(e) => {
                        error!(room = %room, error = %e, "failed to deliver summary");
                        Outcome::Undelivered
                    }
                }
            }
            Err(e) if e.is_cancelled() => {
                info!(room = %room, "summary generation cancelled");
                Outcome::Cancelled
            }
            Err(e) => {
                error!(room = %room, error = %e, "summary generation failed");
                let notice = Delivery::Failure {
                    room: room.to_string(),
                    error: e.to_string(),
                };
                if let Err(e) = self.sink.deliver(&notice).await {
                    error!(room = %room, error = %e, "failed to deliver failure notice");
                }
                Outcome::Failed
            }
        }
    }
}
