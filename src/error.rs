//! Error types for roomscribe operations.
//!
//! This module provides the error hierarchy using `thiserror` for
//! ingestion, summarization, I/O, and CLI commands. Buffer and queue
//! operations are infallible by contract and never produce these errors.

use thiserror::Error;

/// Result type alias for roomscribe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Summarization pipeline errors.
    #[error("summarize error: {0}")]
    Summarize(#[from] SummarizeError),

    /// Chat event ingestion errors.
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if this error represents a cancelled summarization.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Summarize(SummarizeError::Cancelled))
    }
}

/// Errors raised while producing or delivering a summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    /// The request was abandoned because shutdown was requested.
    #[error("summarization cancelled")]
    Cancelled,

    /// The summarization backend failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend answered without any content.
    #[error("backend returned no content")]
    EmptyResponse,

    /// The system prompt could not be loaded.
    #[error("failed to load system prompt: {path}: {reason}")]
    Prompt {
        /// Prompt file path.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// The summary was produced but could not be delivered.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl SummarizeError {
    /// Returns `true` for cancellation, which is never a content error.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors raised while decoding the chat event stream.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A line could not be decoded as a chat event.
    #[error("malformed event on line {line}: {reason}")]
    Malformed {
        /// 1-based line number in the stream.
        line: usize,
        /// Decoder message.
        reason: String,
    },

    /// A required field was empty.
    #[error("event on line {line} is missing field `{field}`")]
    MissingField {
        /// 1-based line number in the stream.
        line: usize,
        /// Field name.
        field: &'static str,
    },

    /// The underlying stream failed.
    #[error("failed to read event stream: {0}")]
    Read(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::Read(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::OutputFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidState {
            message: "worker already running".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: worker already running");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("buffer capacity must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: buffer capacity must be positive"
        );
    }

    #[test]
    fn test_summarize_error_display() {
        assert_eq!(
            SummarizeError::Cancelled.to_string(),
            "summarization cancelled"
        );
        assert_eq!(
            SummarizeError::Backend("429 too many requests".to_string()).to_string(),
            "backend error: 429 too many requests"
        );
        let err = SummarizeError::Prompt {
            path: "prompt.txt".to_string(),
            reason: "not found".to_string(),
        };
        assert!(err.to_string().contains("prompt.txt"));
    }

    #[test]
    fn test_cancellation_is_not_failure() {
        assert!(SummarizeError::Cancelled.is_cancelled());
        assert!(!SummarizeError::EmptyResponse.is_cancelled());

        let err: Error = SummarizeError::Cancelled.into();
        assert!(err.is_cancelled());
        let err: Error = SummarizeError::Backend("boom".to_string()).into();
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_ingest_error_display() {
        let err = IngestError::Malformed {
            line: 7,
            reason: "expected value".to_string(),
        };
        assert_eq!(err.to_string(), "malformed event on line 7: expected value");

        let err = IngestError::MissingField {
            line: 3,
            field: "room",
        };
        assert_eq!(err.to_string(), "event on line 3 is missing field `room`");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: IngestError = io_err.into();
        assert!(matches!(err, IngestError::Read(_)));
    }

    #[test]
    fn test_error_from_nested() {
        let err: Error = CommandError::OutputFormat("key must be a string".to_string()).into();
        assert!(matches!(err, Error::Command(_)));

        let err: Error = IoError::FileNotFound {
            path: "/tmp/events.ndjson".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "I/O error: file not found: /tmp/events.ndjson"
        );
    }

    #[test]
    fn test_from_serde_json_error_to_command_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: CommandError = json_err.into();
        assert!(matches!(err, CommandError::OutputFormat(_)));
    }
}
