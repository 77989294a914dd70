//! Prompts for LLM-backed summarizers.
//!
//! The system prompt defines the minutes format; the user prompt carries
//! the room's formatted lines.

use std::fmt::Write;
use std::path::Path;

use crate::core::Snapshot;
use crate::error::SummarizeError;

/// Built-in system prompt used when no prompt file is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = r"You are a meeting secretary for a group chat. You receive a transcript of chat messages, one per line, in the form `[HH:MM] sender: content`.

Write concise meeting minutes in Markdown with these sections:

## Topics
Bullet list of the subjects discussed, in the order they came up.

## Decisions
Bullet list of decisions that were made, with who made or agreed to them. Write `None` if there were none.

## Action items
Bullet list of `owner: task (deadline if mentioned)`. Write `None` if there were none.

## Open questions
Questions that were raised but not answered. Omit the section if there are none.

Rules:
- Use only information present in the transcript. Do not invent names, dates, or decisions.
- Keep the language of the transcript.
- Ignore greetings, stickers, and off-topic chatter unless they carry information.
- Do not repeat the transcript verbatim.";

/// Loads the system prompt from `path`, or returns the built-in prompt.
///
/// # Errors
///
/// Returns [`SummarizeError::Prompt`] if the file cannot be read or is empty.
pub fn load_system_prompt(path: Option<&Path>) -> Result<String, SummarizeError> {
    let Some(path) = path else {
        return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
    };

    let prompt = std::fs::read_to_string(path).map_err(|e| SummarizeError::Prompt {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(SummarizeError::Prompt {
            path: path.display().to_string(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(prompt.to_string())
}

/// Builds the user message for a snapshot.
#[must_use]
pub fn build_user_prompt(snapshot: &Snapshot) -> String {
    let mut prompt = String::with_capacity(snapshot.lines.iter().map(|l| l.len() + 1).sum::<usize>() + 128);
    let _ = writeln!(
        prompt,
        "Write meeting minutes for the following messages from the group \"{}\".",
        snapshot.room
    );
    if let Some(range) = snapshot.time_range_label() {
        let _ = writeln!(prompt, "Time range: {range}");
    }
    let _ = writeln!(
        prompt,
        "Participants ({}): {}",
        snapshot.participant_count(),
        snapshot
            .participants
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    prompt.push('\n');
    prompt.push_str(&snapshot.lines.join("\n"));
    prompt
}
