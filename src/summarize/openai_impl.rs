//! OpenAI-compatible chat completion summarizer.
//!
//! Works against any endpoint speaking the chat completions API
//! (OpenAI, Gemini's compatibility layer, local servers).

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::prompt::{build_user_prompt, load_system_prompt};
use super::{OPENAI_SUMMARIZER, Summarizer};
use crate::config::LlmSettings;
use crate::core::Snapshot;
use crate::error::{Error, Result, SummarizeError};

/// Summarizer backed by an OpenAI-compatible chat completion endpoint.
pub struct OpenAiSummarizer {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl std::fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

fn backend(err: OpenAIError) -> SummarizeError {
    SummarizeError::Backend(err.to_string())
}

impl OpenAiSummarizer {
    /// Creates a summarizer from LLM settings.
    ///
    /// The system prompt is read once here.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the API key is missing, or a
    /// summarize error when the prompt file cannot be loaded.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::config("an LLM API key is required for the openai summarizer"))?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(settings.base_url.as_str());
        let system_prompt = load_system_prompt(settings.system_prompt_file.as_deref())?;
        debug!(
            model = %settings.model,
            prompt_chars = system_prompt.len(),
            "openai summarizer ready"
        );

        Ok(Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
            system_prompt,
        })
    }

    async fn request(&self, snapshot: &Snapshot) -> std::result::Result<String, SummarizeError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.as_str())
                    .build()
                    .map_err(backend)?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(build_user_prompt(snapshot))
                    .build()
                    .map_err(backend)?
                    .into(),
            ])
            .build()
            .map_err(backend)?;

        debug!(room = %snapshot.room, model = %self.model, "sending summary request");
        let response = self.client.chat().create(request).await.map_err(|e| {
            error!(room = %snapshot.room, error = %e, "chat completion failed");
            backend(e)
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SummarizeError::EmptyResponse)?;
        debug!(room = %snapshot.room, chars = content.len(), "summary response received");
        Ok(content)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn name(&self) -> &'static str {
        OPENAI_SUMMARIZER
    }

    async fn summarize(
        &self,
        snapshot: &Snapshot,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, SummarizeError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SummarizeError::Cancelled),
            result = self.request(snapshot) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let err = OpenAiSummarizer::new(&LlmSettings::default()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let settings = LlmSettings {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            ..LlmSettings::default()
        };
        let summarizer = OpenAiSummarizer::new(&settings).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = summarizer.summarize(&Snapshot::empty("ops"), &cancel).await;
        assert_eq!(result, Err(SummarizeError::Cancelled));
    }
}
