//! Async reader for newline-delimited chat events.

use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::event::ChatEvent;
use crate::error::{IngestError, IoError, Result};

/// Boxed line source used by the CLI (file or stdin).
pub type BoxedInput = Box<dyn AsyncBufRead + Unpin + Send>;

/// Reads [`ChatEvent`]s from a line-oriented stream.
///
/// Blank lines are skipped. Each decode error is returned for its own line
/// so the caller can log it and keep reading.
#[derive(Debug)]
pub struct EventReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: AsyncBufRead + Unpin> EventReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Last line number read (1-based).
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_no
    }

    /// Reads the next event; `None` at end of stream.
    pub async fn next_event(&mut self) -> Option<std::result::Result<ChatEvent, IngestError>> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    self.line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(ChatEvent::parse_line(&line, self.line_no));
                }
                Ok(None) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Opens the event source: a file, or stdin for `None` or `-`.
///
/// # Errors
///
/// Returns an I/O error if the file does not exist or cannot be opened.
pub async fn open_input(path: Option<&Path>) -> Result<EventReader<BoxedInput>> {
    let input: BoxedInput = match path {
        Some(path) if path != Path::new("-") => {
            let path_str = path.display().to_string();
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    IoError::FileNotFound { path: path_str }
                } else {
                    IoError::ReadFailed {
                        path: path_str,
                        reason: e.to_string(),
                    }
                }
            })?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(BufReader::new(tokio::io::stdin())),
    };
    Ok(EventReader::new(input))
}
