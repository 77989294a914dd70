//! # roomscribe
//!
//! Meeting minutes for busy chat rooms.
//!
//! roomscribe buffers chat messages per room in bounded ring buffers,
//! decides when a room's activity warrants a summary, and hands the room to
//! an asynchronous summarization worker through a bounded queue.
//!
//! ## Features
//!
//! - **Ring Buffers**: fixed capacity per room, oldest evicted first, duplicate ids ignored
//! - **Triggers**: message volume, elapsed time since the last summary, or a keyword
//! - **Backpressure**: producers never block; a full queue drops the request
//! - **Cancellation**: shutdown aborts in-flight summaries without losing buffered messages
//! - **Unicode Aware**: grapheme-safe truncation in digests

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod io;
pub mod scheduler;
pub mod scribe;
pub mod summarize;
pub mod trigger;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use crate::core::{Message, Snapshot};

// Re-export buffer and trigger types
pub use buffer::{AddOutcome, BufferRegistry, DEFAULT_CAPACITY, RoomBuffer};
pub use trigger::{Decision, RoomCounters, TriggerReason, TriggerThresholds};

// Re-export pipeline types
pub use config::{Config, LlmSettings};
pub use dispatch::{DispatchQueue, DispatchReceiver, EnqueueOutcome, SummaryWorker, WorkerStats};
pub use ingest::{ChatEvent, EventReader};
pub use scheduler::{IntervalScheduler, ScanReport, scan};
pub use scribe::{IngestOutcome, Scribe};

// Re-export summarizer types
#[cfg(feature = "openai")]
pub use summarize::OpenAiSummarizer;
pub use summarize::{
    Delivery, DigestSummarizer, Summarizer, SummarySink, available_summarizers, create_summarizer,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
