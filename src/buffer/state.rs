//! Fixed-capacity ring of messages for one room.
//!
//! `RoomState` is the unsynchronized core of a room buffer. It is only ever
//! touched through the lock in [`RoomBuffer`](super::RoomBuffer).

use std::collections::HashSet;
use tokio::time::Instant;

use crate::core::{Message, Snapshot};
use crate::trigger::RoomCounters;

/// Result of adding a message to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored in a free slot.
    Inserted,
    /// Stored after evicting the oldest message.
    Evicted {
        /// Id of the message that was dropped.
        evicted_id: String,
    },
    /// The id is already held; nothing changed.
    Duplicate,
}

impl AddOutcome {
    /// Returns `true` if the message was stored.
    #[must_use]
    pub const fn is_inserted(&self) -> bool {
        !self.is_duplicate()
    }

    /// Returns `true` if the message was rejected as a duplicate.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }
}

#[derive(Debug)]
pub(crate) struct RoomState {
    slots: Vec<Option<Message>>,
    /// Next slot to write. When full, also the oldest entry.
    cursor: usize,
    len: usize,
    held_ids: HashSet<String>,
    last_cleared: Option<Instant>,
}

impl RoomState {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            cursor: 0,
            len: 0,
            held_ids: HashSet::with_capacity(capacity),
            last_cleared: None,
        }
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.held_ids.contains(id)
    }

    pub(crate) const fn last_cleared(&self) -> Option<Instant> {
        self.last_cleared
    }

    pub(crate) const fn counters(&self) -> RoomCounters {
        RoomCounters {
            count: self.len,
            last_cleared: self.last_cleared,
        }
    }

    pub(crate) fn push(&mut self, message: Message) -> AddOutcome {
        if self.held_ids.contains(message.id()) {
            return AddOutcome::Duplicate;
        }

        let capacity = self.capacity();
        let evicted = if self.len == capacity {
            self.slots[self.cursor].take().map(|oldest| {
                self.held_ids.remove(oldest.id());
                oldest.id().to_string()
            })
        } else {
            None
        };

        self.held_ids.insert(message.id().to_string());
        self.slots[self.cursor] = Some(message);
        self.cursor = (self.cursor + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }

        debug_assert_eq!(self.held_ids.len(), self.len);
        evicted.map_or(AddOutcome::Inserted, |evicted_id| AddOutcome::Evicted {
            evicted_id,
        })
    }

    /// Messages from oldest to newest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Message> + '_ {
        let capacity = self.capacity();
        let start = (self.cursor + capacity - self.len) % capacity;
        (0..self.len).filter_map(move |step| self.slots[(start + step) % capacity].as_ref())
    }

    pub(crate) fn snapshot(&self, room: &str) -> Snapshot {
        let mut snapshot = Snapshot::empty(room);
        snapshot.lines.reserve(self.len);

        for message in self.iter() {
            if snapshot.first_at.is_none() {
                snapshot.first_at = Some(message.timestamp());
            }
            snapshot.last_at = Some(message.timestamp());
            snapshot.lines.push(message.format_line());
            *snapshot
                .participants
                .entry(message.sender().to_string())
                .or_insert(0) += 1;
        }
        snapshot.count = snapshot.lines.len();
        snapshot
    }

    pub(crate) fn clear(&mut self, now: Instant) -> usize {
        let cleared = self.len;
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.cursor = 0;
        self.len = 0;
        self.held_ids.clear();
        self.last_cleared = Some(now);
        cleared
    }
}
