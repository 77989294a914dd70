//! Bounded hand-off between trigger evaluation and the summary worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Result of a non-blocking enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The room was admitted.
    Queued,
    /// The queue was full; the request was dropped.
    Full,
    /// The queue has been closed for shutdown.
    Closed,
}

impl EnqueueOutcome {
    /// Returns `true` if the room was admitted.
    #[must_use]
    pub const fn is_queued(self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// Producer side of the dispatch queue.
///
/// Producers never block: a full queue rejects the request and leaves the
/// room eligible for the next evaluation. Dropping requests instead of
/// blocking is how backpressure reaches ingestion.
#[derive(Debug)]
pub struct DispatchQueue {
    capacity: usize,
    sender: RwLock<Option<mpsc::Sender<String>>>,
    dropped: AtomicU64,
}

/// Consumer side of the dispatch queue, owned by the single worker.
#[derive(Debug)]
pub struct DispatchReceiver {
    receiver: mpsc::Receiver<String>,
}

impl DispatchQueue {
    /// Creates a queue admitting up to `capacity` pending rooms.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, DispatchReceiver) {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let queue = Self {
            capacity,
            sender: RwLock::new(Some(sender)),
            dropped: AtomicU64::new(0),
        };
        (queue, DispatchReceiver { receiver })
    }

    /// Maximum number of pending rooms.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attempts to queue `room` without waiting.
    ///
    /// Producers share a read lock; only [`close`](Self::close) takes it
    /// exclusively.
    pub fn try_enqueue(&self, room: &str) -> EnqueueOutcome {
        let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            return EnqueueOutcome::Closed;
        };
        match sender.try_send(room.to_string()) {
            Ok(()) => EnqueueOutcome::Queued,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                EnqueueOutcome::Full
            }
            Err(TrySendError::Closed(_)) => EnqueueOutcome::Closed,
        }
    }

    /// Number of pending rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |sender| self.capacity - sender.capacity())
    }

    /// Returns `true` when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requests dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Closes the queue. Pending rooms are still delivered to the worker,
    /// which exits once they are drained.
    ///
    /// Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        self.sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl DispatchReceiver {
    /// Waits for the next room; `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Takes the next room if one is ready.
    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }
}
