//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros. Every setting can
//! also be supplied through an environment variable.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::buffer::DEFAULT_CAPACITY;
use crate::config::{Config, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, LlmSettings};
use crate::dispatch::DEFAULT_QUEUE_CAPACITY;
use crate::summarize::DIGEST_SUMMARIZER;
use crate::trigger::{
    DEFAULT_INTERVAL, DEFAULT_KEYWORD, DEFAULT_MESSAGE_COUNT, DEFAULT_MIN_MESSAGES, TriggerThresholds,
};

/// roomscribe: meeting minutes for busy chat rooms.
///
/// Reads chat events as JSON lines, buffers them per room, and emits a
/// summary whenever a room crosses a volume, time or keyword trigger.
#[derive(Parser, Debug)]
#[command(name = "roomscribe")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consume a chat event stream and emit summaries.
    Run(RunArgs),

    /// Print the effective configuration.
    Config(SettingsArgs),
}

/// Arguments of the `run` command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Pipeline settings.
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Event file, one JSON object per line (stdin if omitted or `-`).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// At end of input, summarize every room holding at least the minimum
    /// number of messages.
    #[arg(long)]
    pub flush: bool,
}

/// Pipeline settings shared by `run` and `config`.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Messages held per room.
    #[arg(long, env = "MAX_BUFFER_SIZE", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Minimum buffered messages before any trigger may fire.
    #[arg(long, env = "MIN_MESSAGES_FOR_SUMMARY", default_value_t = DEFAULT_MIN_MESSAGES)]
    pub min_messages: usize,

    /// Buffered messages that trigger a summary (0 disables).
    #[arg(long, env = "SUMMARY_MESSAGE_COUNT", default_value_t = DEFAULT_MESSAGE_COUNT)]
    pub message_count: usize,

    /// Minutes since the last summary that trigger a new one (0 disables).
    #[arg(long, env = "SUMMARY_INTERVAL_MINUTES", default_value_t = DEFAULT_INTERVAL.as_secs() / 60)]
    pub interval_minutes: u64,

    /// Text that triggers an immediate summary (empty disables).
    #[arg(long, env = "SUMMARY_KEYWORD", default_value = DEFAULT_KEYWORD)]
    pub keyword: String,

    /// Pending summary requests admitted before new ones are dropped.
    #[arg(long, env = "CONCURRENT_SUMMARY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Comma-separated room name fragments to accept (all rooms if empty).
    #[arg(long, env = "TARGET_ROOMS", value_delimiter = ',')]
    pub target_rooms: Vec<String>,

    /// Summarizer backend (digest, openai).
    #[arg(short, long, env = "ROOMSCRIBE_SUMMARIZER", default_value = DIGEST_SUMMARIZER)]
    pub summarizer: String,

    /// API key for the openai summarizer.
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_LLM_BASE_URL)]
    pub llm_base_url: String,

    /// Chat model used by the openai summarizer.
    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_LLM_MODEL)]
    pub llm_model: String,

    /// File holding the summarizer system prompt.
    #[arg(long, env = "SYSTEM_PROMPT_FILE")]
    pub system_prompt_file: Option<PathBuf>,
}

impl SettingsArgs {
    /// Builds the runtime configuration.
    #[must_use]
    pub fn to_config(&self) -> Config {
        let target_rooms = self
            .target_rooms
            .iter()
            .map(|room| room.trim().to_string())
            .filter(|room| !room.is_empty())
            .collect();

        Config {
            buffer_capacity: self.capacity,
            queue_capacity: self.queue_capacity,
            triggers: TriggerThresholds {
                min_messages_for_summary: self.min_messages,
                message_count_threshold: self.message_count,
                interval: Duration::from_secs(self.interval_minutes.saturating_mul(60)),
                keyword: self.keyword.clone(),
            },
            target_rooms,
            summarizer: self.summarizer.to_lowercase(),
            llm: LlmSettings {
                api_key: self.llm_api_key.clone().filter(|key| !key.is_empty()),
                base_url: self.llm_base_url.clone(),
                model: self.llm_model.clone(),
                system_prompt_file: self.system_prompt_file.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "roomscribe",
            "run",
            "--input",
            "events.ndjson",
            "--flush",
            "--capacity",
            "20",
            "--interval-minutes",
            "0",
            "--keyword",
            "!minutes",
            "--target-rooms",
            "ops, platform,",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.flush);
        assert_eq!(args.input, Some(PathBuf::from("events.ndjson")));

        let config = args.settings.to_config();
        assert_eq!(config.buffer_capacity, 20);
        assert_eq!(config.triggers.interval, Duration::ZERO);
        assert_eq!(config.triggers.keyword, "!minutes");
        assert_eq!(config.target_rooms, vec!["ops", "platform"]);
    }

    #[test]
    fn test_config_defaults() {
        let cli = Cli::try_parse_from(["roomscribe", "--format", "json", "config"]).unwrap();
        assert_eq!(cli.format, "json");
        let Commands::Config(settings) = cli.command else {
            panic!("expected config command");
        };
        let config = settings.to_config();
        assert_eq!(config.triggers.min_messages_for_summary, 5);
        assert_eq!(config.triggers.interval, Duration::from_secs(30 * 60));
        assert_eq!(config.summarizer, "digest");
    }
}
