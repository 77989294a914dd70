//! Chat message model.
//!
//! A [`Message`] is one chat event accepted into a room buffer. It is
//! immutable once built; the id is carried verbatim and only compared by
//! byte equality for duplicate suppression.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Format used for the short time label on formatted lines.
pub const TIME_LABEL_FORMAT: &str = "%H:%M";

/// A single chat message belonging to a room.
///
/// # Examples
///
/// ```
/// use roomscribe::core::Message;
///
/// let msg = Message::new("m-1", "alice", "standup in 5", "Platform Team");
/// assert_eq!(msg.id(), "m-1");
/// assert!(msg.format_line().ends_with("alice: standup in 5"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    timestamp: DateTime<Utc>,
    sender: String,
    content: String,
    room: String,
}

impl Message {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self::at(id, Utc::now(), sender, content, room)
    }

    /// Creates a message with an explicit timestamp.
    #[must_use]
    pub fn at(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        sender: impl Into<String>,
        content: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            sender: sender.into(),
            content: content.into(),
            room: room.into(),
        }
    }

    /// Originating event id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the message was sent.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Display name of the sender.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Room the message belongs to.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Short local-time label, e.g. `09:41`.
    #[must_use]
    pub fn time_label(&self) -> String {
        time_label(self.timestamp)
    }

    /// Returns `true` when the content is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Formats the message as `[HH:MM] sender: content`.
    #[must_use]
    pub fn format_line(&self) -> String {
        format!("[{}] {}: {}", self.time_label(), self.sender, self.content)
    }
}

/// Renders a timestamp as a local `HH:MM` label.
#[must_use]
pub fn time_label(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(TIME_LABEL_FORMAT)
        .to_string()
}
