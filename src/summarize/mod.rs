//! Summarization backends and delivery.
//!
//! The worker hands a [`Snapshot`] to a [`Summarizer`] and passes the
//! rendered result to a [`SummarySink`]. Two backends ship with the crate:
//!
//! - **digest**: deterministic offline digest (activity and recent highlights)
//! - **openai**: OpenAI-compatible chat completion (requires the `openai` feature)

mod digest;
#[cfg(feature = "openai")]
mod openai_impl;
pub mod prompt;

pub use digest::DigestSummarizer;
#[cfg(feature = "openai")]
pub use openai_impl::OpenAiSummarizer;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::LlmSettings;
use crate::core::Snapshot;
use crate::error::{Result, SummarizeError};

/// Name of the offline digest backend.
pub const DIGEST_SUMMARIZER: &str = "digest";

/// Name of the OpenAI-compatible backend.
pub const OPENAI_SUMMARIZER: &str = "openai";

/// Produces summary text from a room snapshot.
///
/// Implementations may take arbitrarily long and should return
/// [`SummarizeError::Cancelled`] promptly once `cancel` fires. They are
/// called at most once per dequeued room and must not retry internally.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Summarizes the snapshot's lines.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizeError::Cancelled`] on cancellation, or another
    /// variant when the backend fails.
    async fn summarize(
        &self,
        snapshot: &Snapshot,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, SummarizeError>;
}

/// Something the worker hands to a [`SummarySink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    /// A finished summary report.
    Summary {
        /// Room the report covers.
        room: String,
        /// Rendered report.
        text: String,
        /// Messages summarized.
        message_count: usize,
        /// Distinct senders.
        participant_count: usize,
    },
    /// Notice that summarization failed; the buffer was kept.
    Failure {
        /// Room that failed.
        room: String,
        /// Error description.
        error: String,
    },
}

impl Delivery {
    /// Room this delivery concerns.
    #[must_use]
    pub fn room(&self) -> &str {
        match self {
            Self::Summary { room, .. } | Self::Failure { room, .. } => room,
        }
    }

    /// Human-readable text for the delivery.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Summary { text, .. } => text.clone(),
            Self::Failure { room, error } => {
                format!("Error generating meeting minutes for \"{room}\": {error}")
            }
        }
    }
}

/// Receives summaries and failure notices.
#[async_trait]
pub trait SummarySink: Send + Sync {
    /// Delivers one item.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizeError::Delivery`] when the item could not be sent.
    /// A failed summary delivery keeps the room's buffer.
    async fn deliver(&self, delivery: &Delivery) -> std::result::Result<(), SummarizeError>;
}

/// Wraps a summarizer body in the report header and statistics footer.
///
/// # Examples
///
/// ```
/// use chrono::Local;
/// use roomscribe::core::Snapshot;
/// use roomscribe::summarize::render_report;
///
/// let snapshot = Snapshot::empty("ops");
/// let report = render_report(&snapshot, "Nothing happened.", Local::now());
/// assert!(report.starts_with("# ops meeting minutes"));
/// assert!(report.contains("Nothing happened."));
/// ```
#[must_use]
pub fn render_report(snapshot: &Snapshot, body: &str, generated_at: DateTime<Local>) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "# {} meeting minutes", snapshot.room);
    let _ = writeln!(report, "Date: {}", generated_at.format("%Y-%m-%d (%A)"));
    let _ = writeln!(
        report,
        "Time: {}",
        snapshot
            .time_range_label()
            .unwrap_or_else(|| "N/A".to_string())
    );
    report.push('\n');
    report.push_str(body.trim());
    report.push_str("\n\n---\n");
    let _ = write!(
        report,
        "Stats: {} messages, {} participants",
        snapshot.count,
        snapshot.participant_count()
    );
    report
}

/// Creates a summarizer by name.
///
/// # Errors
///
/// Returns a configuration error for unknown names, for `openai` when the
/// crate was built without the `openai` feature, or when the backend
/// cannot be initialized.
pub fn create_summarizer(name: &str, llm: &LlmSettings) -> Result<Arc<dyn Summarizer>> {
    match name.to_lowercase().as_str() {
        DIGEST_SUMMARIZER => Ok(Arc::new(DigestSummarizer::new())),
        #[cfg(feature = "openai")]
        OPENAI_SUMMARIZER => Ok(Arc::new(OpenAiSummarizer::new(llm)?)),
        #[cfg(not(feature = "openai"))]
        OPENAI_SUMMARIZER => {
            let _ = llm;
            Err(crate::error::Error::config(
                "the openai summarizer requires building with the `openai` feature",
            ))
        }
        _ => Err(crate::error::Error::config(format!(
            "unknown summarizer: {name}"
        ))),
    }
}

/// Lists available summarizer names.
#[must_use]
pub fn available_summarizers() -> Vec<&'static str> {
    vec![DIGEST_SUMMARIZER, OPENAI_SUMMARIZER]
}
