//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats. Summaries are written as they
//! are produced by [`WriterSink`]; in JSON mode each delivery is one line.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::dispatch::WorkerStats;
use crate::error::{CommandError, Error, Result, SummarizeError};
use crate::summarize::{Delivery, SummarySink};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats one summary or failure notice.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_delivery(delivery: &Delivery, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut output = delivery.text();
            output.push_str("\n\n");
            Ok(output)
        }
        OutputFormat::Json => json_line(delivery),
    }
}

/// Sink writing deliveries to an async writer.
#[derive(Debug)]
pub struct WriterSink<W> {
    format: OutputFormat,
    writer: Mutex<W>,
}

/// Sink writing to standard output.
pub type StdoutSink = WriterSink<Stdout>;

impl StdoutSink {
    /// Creates a sink on standard output.
    #[must_use]
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(tokio::io::stdout(), format)
    }
}

impl<W> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            format,
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> SummarySink for WriterSink<W> {
    async fn deliver(&self, delivery: &Delivery) -> std::result::Result<(), SummarizeError> {
        let output = format_delivery(delivery, self.format)
            .map_err(|e| SummarizeError::Delivery(e.to_string()))?;
        let mut writer = self.writer.lock().await;
        writer
            .write_all(output.as_bytes())
            .await
            .map_err(|e| SummarizeError::Delivery(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| SummarizeError::Delivery(e.to_string()))
    }
}

/// Counters for one `run` invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Events decoded.
    pub events: usize,
    /// Lines that could not be decoded.
    pub malformed: usize,
    /// Events dropped by the room or blank content filter.
    pub filtered: usize,
    /// Events whose id was already buffered.
    pub duplicates: usize,
    /// Trigger firings the full queue rejected.
    pub dropped: u64,
    /// Worker outcome counters.
    pub worker: WorkerStats,
}

/// Formats the end-of-run report.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_run_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(
                output,
                "Processed {} events ({} malformed, {} filtered, {} duplicates)",
                report.events, report.malformed, report.filtered, report.duplicates
            );
            let _ = writeln!(
                output,
                "Summaries: {} delivered, {} failed, {} cancelled, {} dropped",
                report.worker.summarized, report.worker.failed, report.worker.cancelled, report.dropped
            );
            Ok(output)
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Tagged<'a> {
                kind: &'static str,
                #[serde(flatten)]
                report: &'a RunReport,
            }
            json_line(&Tagged {
                kind: "report",
                report,
            })
        }
    }
}

/// Formats the effective configuration.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_config(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_config_text(config)),
        OutputFormat::Json => format_json(config),
    }
}

fn format_config_text(config: &Config) -> String {
    let triggers = &config.triggers;
    let mut output = String::new();
    output.push_str("roomscribe configuration\n");
    output.push_str("========================\n\n");
    let _ = writeln!(output, "  Buffer capacity:   {}", config.buffer_capacity);
    let _ = writeln!(output, "  Queue capacity:    {}", config.queue_capacity);
    let _ = writeln!(output, "  Minimum messages:  {}", triggers.min_messages_for_summary);
    let _ = writeln!(
        output,
        "  Message count:     {}",
        enabled_or_off(triggers.message_count_threshold > 0, triggers.message_count_threshold)
    );
    let _ = writeln!(
        output,
        "  Interval:          {}",
        enabled_or_off(
            triggers.interval_enabled(),
            format!("{} min", triggers.interval.as_secs() / 60)
        )
    );
    let _ = writeln!(
        output,
        "  Keyword:           {}",
        enabled_or_off(!triggers.keyword.is_empty(), &triggers.keyword)
    );
    let rooms = if config.target_rooms.is_empty() {
        "all".to_string()
    } else {
        config.target_rooms.join(", ")
    };
    let _ = writeln!(output, "  Target rooms:      {rooms}");
    let _ = writeln!(output, "  Summarizer:        {}", config.summarizer);
    let _ = writeln!(output, "  LLM model:         {}", config.llm.model);
    output
}

fn enabled_or_off(enabled: bool, value: impl std::fmt::Display) -> String {
    if enabled {
        value.to_string()
    } else {
        "off".to_string()
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            serde_json::to_string(&ErrorOutput {
                error: error.to_string(),
            })
            .unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Formats a value as pretty JSON.
fn format_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value).map_err(CommandError::from)?)
}

/// Formats a value as one JSON line.
fn json_line<T: Serialize>(value: &T) -> Result<String> {
    let mut line = serde_json::to_string(value).map_err(CommandError::from)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Delivery {
        Delivery::Summary {
            room: "ops".to_string(),
            text: "# ops meeting minutes".to_string(),
            message_count: 3,
            participant_count: 2,
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_format_delivery_json_is_one_line() {
        let line = format_delivery(&summary(), OutputFormat::Json).unwrap();
        assert_eq!(line.matches('\n').count(), 1);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "summary");
        assert_eq!(value["room"], "ops");
        assert_eq!(value["message_count"], 3);
    }

    #[test]
    fn test_format_failure_text() {
        let failure = Delivery::Failure {
            room: "ops".to_string(),
            error: "backend error: timeout".to_string(),
        };
        let text = format_delivery(&failure, OutputFormat::Text).unwrap();
        assert!(text.starts_with("Error generating meeting minutes for \"ops\""));
    }

    #[tokio::test]
    async fn test_writer_sink() {
        let sink = WriterSink::new(Vec::new(), OutputFormat::Text);
        sink.deliver(&summary()).await.unwrap();
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "# ops meeting minutes\n\n");
    }

    #[test]
    fn test_format_config() {
        let mut config = Config::default();
        config.triggers.keyword = String::new();
        let text = format_config(&config, OutputFormat::Text).unwrap();
        assert!(text.contains("Buffer capacity:   200"));
        assert!(text.contains("Interval:          30 min"));
        assert!(text.contains("Keyword:           off"));
        assert!(text.contains("Target rooms:      all"));

        let json = format_config(&config, OutputFormat::Json).unwrap();
        assert!(json.contains("\"buffer_capacity\": 200"));
    }

    #[test]
    fn test_format_run_report() {
        let report = RunReport {
            events: 12,
            malformed: 1,
            ..RunReport::default()
        };
        let text = format_run_report(&report, OutputFormat::Text).unwrap();
        assert!(text.contains("Processed 12 events (1 malformed"));

        let json = format_run_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "report");
        assert_eq!(value["events"], 12);
        assert_eq!(value["worker"]["summarized"], 0);
    }

    #[test]
    fn test_unserializable_value_is_an_output_error() {
        let mut value = std::collections::HashMap::new();
        value.insert((1u8, 2u8), "non-string key");

        let err = format_json(&value).unwrap_err();
        assert!(matches!(
            err,
            Error::Command(CommandError::OutputFormat(_))
        ));
        assert!(err.to_string().starts_with("command error: output format error"));
        assert!(json_line(&value).is_err());
    }

    #[test]
    fn test_format_error() {
        let err = Error::config("bad");
        assert_eq!(format_error(&err, OutputFormat::Text), "configuration error: bad");
        assert!(format_error(&err, OutputFormat::Json).contains("\"error\""));
    }
}
