//! Lock-guarded buffer for a single room.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use tracing::{debug, info};

use super::state::{AddOutcome, RoomState};
use crate::core::{Message, Snapshot};
use crate::trigger::{Decision, TriggerThresholds};

/// Bounded message buffer for one room.
///
/// Every operation takes the room's single lock for its whole duration, so
/// no caller ever observes a half-applied add or clear. Different rooms
/// have different locks and never contend.
///
/// # Examples
///
/// ```
/// use roomscribe::buffer::RoomBuffer;
/// use roomscribe::core::Message;
///
/// let buffer = RoomBuffer::new("ops", 2);
/// for id in ["a", "b", "c"] {
///     let _ = buffer.add(Message::new(id, "alice", "hi", "ops"));
/// }
/// assert_eq!(buffer.message_ids(), ["b", "c"]);
/// ```
#[derive(Debug)]
pub struct RoomBuffer {
    room: String,
    state: Mutex<RoomState>,
}

impl RoomBuffer {
    /// Creates an empty buffer holding at most `capacity` messages.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(room: impl Into<String>, capacity: usize) -> Self {
        Self {
            room: room.into(),
            state: Mutex::new(RoomState::with_capacity(capacity)),
        }
    }

    /// Room identifier.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    // Room state stays consistent across every operation, so a panic in
    // another holder cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Maximum number of messages held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Live message count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when the buffer holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a message with `id` is currently held.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    /// When the buffer was last cleared, if ever.
    #[must_use]
    pub fn last_cleared(&self) -> Option<Instant> {
        self.lock().last_cleared()
    }

    /// Adds a message, evicting the oldest one when full.
    ///
    /// A message whose id is already held is ignored.
    pub fn add(&self, message: Message) -> AddOutcome {
        let id = message.id().to_string();
        let mut state = self.lock();
        let outcome = state.push(message);
        let count = state.len();
        drop(state);

        match &outcome {
            AddOutcome::Duplicate => {
                debug!(room = %self.room, id = %id, "duplicate message ignored");
            }
            AddOutcome::Evicted { evicted_id } => {
                debug!(room = %self.room, id = %id, evicted = %evicted_id, count, "message buffered, oldest evicted");
            }
            AddOutcome::Inserted => {
                debug!(room = %self.room, id = %id, count, "message buffered");
            }
        }
        outcome
    }

    /// Exports the buffered messages, oldest first, without mutating them.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot(&self.room)
    }

    /// Held message ids, oldest first.
    #[must_use]
    pub fn message_ids(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|message| message.id().to_string())
            .collect()
    }

    /// Empties the buffer and records the clear time.
    ///
    /// Returns the number of messages dropped.
    pub fn clear(&self) -> usize {
        self.clear_at(Instant::now())
    }

    /// Empties the buffer, recording `now` as the clear time.
    pub fn clear_at(&self, now: Instant) -> usize {
        let cleared = self.lock().clear(now);
        info!(room = %self.room, cleared, "room buffer cleared");
        cleared
    }

    /// Evaluates the trigger policy at `now` under the room lock.
    #[must_use]
    pub fn evaluate(
        &self,
        keyword_hit: bool,
        thresholds: &TriggerThresholds,
        now: Instant,
    ) -> Decision {
        let counters = self.lock().counters();
        let decision = thresholds.evaluate(counters, keyword_hit, now);
        match decision {
            Decision::Fire(reason) => {
                info!(room = %self.room, %reason, "summary triggered");
            }
            Decision::BelowFloor { count, floor } => {
                debug!(room = %self.room, count, floor, "not enough messages for summary");
            }
            Decision::Idle => {}
        }
        decision
    }

    /// Returns `true` if the room is eligible for summarization now.
    #[must_use]
    pub fn should_summarize(&self, keyword_hit: bool, thresholds: &TriggerThresholds) -> bool {
        self.evaluate(keyword_hit, thresholds, Instant::now())
            .should_summarize()
    }
}
