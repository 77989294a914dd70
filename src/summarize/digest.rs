//! Offline digest summarizer.
//!
//! Produces a deterministic digest without any network call: who spoke and
//! how much, plus the most recent lines. Useful for replaying logs and as a
//! fallback when no LLM backend is configured.

use async_trait::async_trait;
use std::fmt::Write;
use tokio_util::sync::CancellationToken;

use super::{DIGEST_SUMMARIZER, Summarizer};
use crate::core::Snapshot;
use crate::error::SummarizeError;
use crate::io::unicode::{preview, single_line};

/// Default number of recent lines quoted in the digest.
pub const DEFAULT_HIGHLIGHTS: usize = 5;

/// Default maximum graphemes per quoted line.
pub const DEFAULT_LINE_WIDTH: usize = 120;

/// Deterministic digest of a snapshot.
///
/// # Examples
///
/// ```
/// use roomscribe::core::Snapshot;
/// use roomscribe::summarize::{DigestSummarizer, Summarizer};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let digest = DigestSummarizer::new();
/// let text = digest
///     .summarize(&Snapshot::empty("ops"), &CancellationToken::new())
///     .await
///     .unwrap();
/// assert!(text.contains("0 messages"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct DigestSummarizer {
    max_highlights: usize,
    line_width: usize,
}

impl Default for DigestSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestSummarizer {
    /// Creates a digest summarizer with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_highlights: DEFAULT_HIGHLIGHTS,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// Sets how many recent lines to quote.
    #[must_use]
    pub const fn max_highlights(mut self, n: usize) -> Self {
        self.max_highlights = n;
        self
    }

    /// Sets the maximum graphemes per quoted line.
    #[must_use]
    pub fn line_width(mut self, width: usize) -> Self {
        self.line_width = width.max(1);
        self
    }

    fn render(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "{} messages from {} participants",
            snapshot.count,
            snapshot.participant_count()
        );
        if let Some(range) = snapshot.time_range_label() {
            let _ = write!(out, " ({range})");
        }
        out.push_str(".\n");

        if !snapshot.participants.is_empty() {
            out.push_str("\nMost active:\n");
            for (sender, count) in snapshot.most_active() {
                let _ = writeln!(out, "- {sender}: {count}");
            }
        }

        let skip = snapshot.lines.len().saturating_sub(self.max_highlights);
        let recent = &snapshot.lines[skip..];
        if !recent.is_empty() {
            out.push_str("\nRecent highlights:\n");
            for line in recent {
                let _ = writeln!(out, "- {}", preview(&single_line(line), self.line_width));
            }
        }
        out
    }
}

#[async_trait]
impl Summarizer for DigestSummarizer {
    fn name(&self) -> &'static str {
        DIGEST_SUMMARIZER
    }

    async fn summarize(
        &self,
        snapshot: &Snapshot,
        cancel: &CancellationToken,
    ) -> Result<String, SummarizeError> {
        if cancel.is_cancelled() {
            return Err(SummarizeError::Cancelled);
        }
        Ok(self.render(snapshot))
    }
}
