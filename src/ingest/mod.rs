//! Chat event ingestion.
//!
//! The transport is external; this module decodes its output, one JSON
//! object per line, into [`Message`](crate::core::Message)s.

mod event;
mod reader;

pub use event::ChatEvent;
pub use reader::{BoxedInput, EventReader, open_input};
