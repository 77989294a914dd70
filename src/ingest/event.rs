//! Wire format of inbound chat events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Message;
use crate::error::IngestError;

/// One chat event as delivered by the transport, one JSON object per line.
///
/// ```json
/// {"id":"m1","timestamp":"2025-06-02T09:00:00Z","sender":"alice","content":"hi","room":"ops"}
/// ```
///
/// `timestamp` is optional and defaults to the time of ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Transport message id.
    #[serde(alias = "msg_id")]
    pub id: String,

    /// Send time (RFC 3339).
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Sender display name.
    pub sender: String,

    /// Message text.
    pub content: String,

    /// Room name.
    #[serde(alias = "room_topic")]
    pub room: String,
}

impl ChatEvent {
    /// Decodes one line of the event stream.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Malformed`] for invalid JSON and
    /// [`IngestError::MissingField`] when `id`, `sender` or `room` is blank.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, IngestError> {
        let event: Self = serde_json::from_str(line).map_err(|e| IngestError::Malformed {
            line: line_no,
            reason: e.to_string(),
        })?;

        for (field, value) in [("id", &event.id), ("sender", &event.sender), ("room", &event.room)] {
            if value.trim().is_empty() {
                return Err(IngestError::MissingField {
                    line: line_no,
                    field,
                });
            }
        }
        Ok(event)
    }

    /// Converts the event into a buffered message.
    #[must_use]
    pub fn into_message(self) -> Message {
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        Message::at(self.id, timestamp, self.sender, self.content, self.room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_full_event() {
        let line = r#"{"id":"m1","timestamp":"2025-06-02T09:00:00Z","sender":"alice","content":"hi","room":"ops"}"#;
        let event = ChatEvent::parse_line(line, 1).unwrap();
        assert_eq!(event.id, "m1");
        assert_eq!(
            event.timestamp,
            Some(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap())
        );

        let message = event.into_message();
        assert_eq!(message.room(), "ops");
        assert_eq!(message.sender(), "alice");
    }

    #[test]
    fn test_parse_aliases_and_default_timestamp() {
        let line = r#"{"msg_id":"m2","sender":"bob","content":"yo","room_topic":"dev"}"#;
        let event = ChatEvent::parse_line(line, 4).unwrap();
        assert_eq!(event.id, "m2");
        assert_eq!(event.room, "dev");
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn test_parse_errors() {
        let err = ChatEvent::parse_line("{not json", 9).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { line: 9, .. }));

        let line = r#"{"id":"m3","sender":"bob","content":"yo","room":"  "}"#;
        let err = ChatEvent::parse_line(line, 2).unwrap_err();
        assert!(matches!(err, IngestError::MissingField { line: 2, field: "room" }));
    }
}
