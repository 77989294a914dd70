//! Runtime configuration.
//!
//! Configuration is read once (from CLI flags and environment variables,
//! see [`crate::cli::parser`]) into an explicit [`Config`] value and passed
//! to each component. Nothing is read from global state afterwards.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::buffer::DEFAULT_CAPACITY;
use crate::dispatch::DEFAULT_QUEUE_CAPACITY;
use crate::error::{Error, Result};
use crate::summarize::{DIGEST_SUMMARIZER, OPENAI_SUMMARIZER, available_summarizers};
use crate::trigger::TriggerThresholds;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Settings for the OpenAI-compatible summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API key; never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Base URL of the chat completion API.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// File holding the system prompt (built-in prompt when absent).
    pub system_prompt_file: Option<PathBuf>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            system_prompt_file: None,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Messages held per room.
    pub buffer_capacity: usize,

    /// Pending summary requests the dispatch queue admits.
    pub queue_capacity: usize,

    /// Trigger policy.
    pub triggers: TriggerThresholds,

    /// Room name fragments to accept (empty = every room).
    pub target_rooms: Vec<String>,

    /// Summarizer backend name.
    pub summarizer: String,

    /// LLM backend settings.
    pub llm: LlmSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            triggers: TriggerThresholds::default(),
            target_rooms: Vec::new(),
            summarizer: DIGEST_SUMMARIZER.to_string(),
            llm: LlmSettings::default(),
        }
    }
}

impl Config {
    /// Checks the configuration for values the pipeline cannot run with.
    ///
    /// Combinations that run but can never fire a trigger are logged as
    /// warnings rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero capacity, an unknown summarizer,
    /// or a missing API key when the OpenAI summarizer is selected.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::config("buffer capacity must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(Error::config("queue capacity must be at least 1"));
        }

        let summarizer = self.summarizer.to_lowercase();
        if !available_summarizers().contains(&summarizer.as_str()) {
            return Err(Error::config(format!(
                "unknown summarizer `{}` (available: {})",
                self.summarizer,
                available_summarizers().join(", ")
            )));
        }
        if summarizer == OPENAI_SUMMARIZER
            && self.llm.api_key.as_deref().is_none_or(str::is_empty)
        {
            return Err(Error::config(
                "an LLM API key is required for the openai summarizer",
            ));
        }

        let triggers = &self.triggers;
        if triggers.min_messages_for_summary > self.buffer_capacity {
            warn!(
                floor = triggers.min_messages_for_summary,
                capacity = self.buffer_capacity,
                "minimum message floor exceeds buffer capacity; no summary can ever trigger"
            );
        }
        if triggers.message_count_threshold > self.buffer_capacity {
            warn!(
                threshold = triggers.message_count_threshold,
                capacity = self.buffer_capacity,
                "message count threshold exceeds buffer capacity; volume trigger cannot fire"
            );
        }
        Ok(())
    }

    /// Returns `true` if messages from `room` should be buffered.
    ///
    /// Matching is a case-insensitive substring test against each target.
    #[must_use]
    pub fn accepts_room(&self, room: &str) -> bool {
        if self.target_rooms.is_empty() {
            return true;
        }
        let room = room.to_lowercase();
        self.target_rooms
            .iter()
            .any(|target| room.contains(&target.to_lowercase()))
    }

    /// Logs the effective trigger policy.
    pub fn log_summary(&self) {
        let triggers = &self.triggers;
        info!(
            capacity = self.buffer_capacity,
            queue = self.queue_capacity,
            summarizer = %self.summarizer,
            "configuration loaded"
        );
        if self.target_rooms.is_empty() {
            info!("target rooms: all rooms");
        } else {
            info!(rooms = %self.target_rooms.join(", "), "target rooms");
        }
        if triggers.interval_enabled() {
            info!(minutes = triggers.interval.as_secs() / 60, "time trigger enabled");
        } else {
            info!("time trigger disabled");
        }
        if triggers.message_count_threshold > 0 {
            info!(messages = triggers.message_count_threshold, "volume trigger enabled");
        } else {
            info!("volume trigger disabled");
        }
        if triggers.keyword.is_empty() {
            info!("keyword trigger disabled");
        } else {
            info!(keyword = %triggers.keyword, "keyword trigger enabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_capacity, 200);
        assert_eq!(config.queue_capacity, 10);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = Config {
            buffer_capacity: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer capacity"));

        let config = Config {
            queue_capacity: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_summarizer_rejected() {
        let config = Config {
            summarizer: "magic".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_openai_requires_api_key() {
        let mut config = Config {
            summarizer: "openai".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        config.llm.api_key = Some(String::new());
        assert!(config.validate().is_err());

        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_accepts_room() {
        let mut config = Config::default();
        assert!(config.accepts_room("anything"));

        config.target_rooms = vec!["Platform".to_string(), "ops".to_string()];
        assert!(config.accepts_room("platform team weekly"));
        assert!(config.accepts_room("DevOps"));
        assert!(!config.accepts_room("random"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
