//! Point-in-time export of a room buffer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::message::time_label;

/// Immutable, ordered view of the messages a room held at one instant.
///
/// Lines run oldest to newest. Building a snapshot never mutates the
/// buffer it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Room the snapshot was taken from.
    pub room: String,

    /// Formatted lines, oldest first.
    pub lines: Vec<String>,

    /// Distinct senders with the number of messages each sent.
    pub participants: BTreeMap<String, usize>,

    /// Timestamp of the oldest message, if any.
    pub first_at: Option<DateTime<Utc>>,

    /// Timestamp of the newest message, if any.
    pub last_at: Option<DateTime<Utc>>,

    /// Number of messages captured.
    pub count: usize,
}

impl Snapshot {
    /// Creates an empty snapshot for a room.
    #[must_use]
    pub fn empty(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            ..Default::default()
        }
    }

    /// Returns `true` when no messages were captured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of distinct senders.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Senders ordered by message count, most active first.
    ///
    /// Ties keep alphabetical order.
    #[must_use]
    pub fn most_active(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> = self
            .participants
            .iter()
            .map(|(sender, count)| (sender.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Local time range covered by the snapshot, e.g. `09:00 - 09:45`.
    #[must_use]
    pub fn time_range_label(&self) -> Option<String> {
        match (self.first_at, self.last_at) {
            (Some(first), Some(last)) => {
                Some(format!("{} - {}", time_label(first), time_label(last)))
            }
            _ => None,
        }
    }
}
