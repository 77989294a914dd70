//! Room registry.
//!
//! Maps room identifiers to their buffers. The map lock is held only for
//! lookup and first insertion; room operations run on the returned
//! [`RoomBuffer`] after the map lock is released.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use super::room::RoomBuffer;
use super::state::AddOutcome;
use crate::core::{Message, Snapshot};

/// Concurrent, grow-only map from room id to buffer.
#[derive(Debug)]
pub struct BufferRegistry {
    capacity: usize,
    rooms: RwLock<HashMap<String, Arc<RoomBuffer>>>,
}

impl BufferRegistry {
    /// Creates an empty registry whose rooms hold `capacity` messages each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Per-room capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the buffer for `room`, if it has been seen.
    #[must_use]
    pub fn get(&self, room: &str) -> Option<Arc<RoomBuffer>> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room)
            .cloned()
    }

    /// Returns the buffer for `room`, creating it on first use.
    ///
    /// Concurrent first calls for the same room all receive the same buffer.
    pub fn get_or_create(&self, room: &str) -> Arc<RoomBuffer> {
        if let Some(buffer) = self.get(room) {
            return buffer;
        }

        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have inserted between the read and write locks.
        let buffer = rooms.entry(room.to_string()).or_insert_with(|| {
            info!(room = %room, capacity = self.capacity, "tracking new room");
            Arc::new(RoomBuffer::new(room, self.capacity))
        });
        Arc::clone(buffer)
    }

    /// Ids of every room seen so far, in no particular order.
    #[must_use]
    pub fn list_room_ids(&self) -> Vec<String> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of known rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no room has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Routes a message to its room's buffer.
    pub fn add(&self, message: Message) -> AddOutcome {
        self.get_or_create(message.room()).add(message)
    }

    /// Snapshot of `room`; empty for an unknown room.
    #[must_use]
    pub fn snapshot(&self, room: &str) -> Snapshot {
        self.get(room)
            .map_or_else(|| Snapshot::empty(room), |buffer| buffer.snapshot())
    }

    /// Clears `room`; a no-op returning zero for an unknown room.
    pub fn clear(&self, room: &str) -> usize {
        self.get(room).map_or(0, |buffer| buffer.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_get_or_create_is_lazy() {
        let registry = BufferRegistry::new(4);
        assert!(registry.is_empty());
        assert!(registry.get("ops").is_none());

        let first = registry.get_or_create("ops");
        let second = registry.get_or_create("ops");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.capacity(), 4);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_room_is_noop() {
        let registry = BufferRegistry::new(4);
        assert_eq!(registry.clear("ghost"), 0);
        let snapshot = registry.snapshot("ghost");
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.room, "ghost");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_routes_by_room() {
        let registry = BufferRegistry::new(4);
        let _ = registry.add(Message::new("1", "a", "x", "red"));
        let _ = registry.add(Message::new("2", "a", "y", "blue"));
        let _ = registry.add(Message::new("3", "a", "z", "red"));

        let mut rooms = registry.list_room_ids();
        rooms.sort();
        assert_eq!(rooms, ["blue", "red"]);
        assert_eq!(registry.snapshot("red").count, 2);
        assert_eq!(registry.clear("red"), 2);
        assert_eq!(registry.snapshot("blue").count, 1);
    }

    #[test]
    fn test_racing_first_insert_keeps_one_buffer() {
        let registry = Arc::new(BufferRegistry::new(8));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.get_or_create("contended"))
            })
            .collect();
        let buffers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        for buffer in &buffers[1..] {
            assert!(Arc::ptr_eq(&buffers[0], buffer));
        }
    }
}
