//! # API Module
//!
//! This module handles the single interaction the generator needs with an OpenAI
//! compatible API: send one prompt with a completion token budget, get text back.
//!
//! [`TextGenerator`] is the seam the rest of the crate talks to. [`OpenAiGenerator`]
//! implements it with `async_openai` against any `/chat/completions` endpoint
//! (OpenAI, or a local server such as llama.cpp or vLLM).
//!
//! No retries are layered on top of what the client already does.
//!
//! # Example
//!
//! ```no_run
//! use synth_journal::api::{OpenAiGenerator, TextGenerator};
//! use synth_journal::config::JournalConfig;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = JournalConfig::default();
//! let generator = OpenAiGenerator::new(&config, "sk-...".to_string());
//! let text = generator.generate("Write one sentence.", 50).await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::debug;

use crate::config::JournalConfig;
use crate::error::GenerationError;

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, spending at most `max_tokens` completion tokens.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

/// Creates a new OpenAI API client from configuration.
fn create_client(config: &JournalConfig, api_key: String) -> Client<OpenAIConfig> {
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.api_base.clone());
    debug!("Client created for {} ({})", config.api_base, config.model);
    Client::with_config(openai_config)
}

/// [`TextGenerator`] backed by an OpenAI compatible chat completions endpoint.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(config: &JournalConfig, api_key: String) -> Self {
        Self {
            client: create_client(config, api_key),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    #[allow(deprecated)]
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        // `max_tokens` rather than `max_completion_tokens`: local servers only know the former
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .max_tokens(max_tokens)
            .temperature(self.temperature)
            .messages([message.into()])
            .build()?;

        debug!("Sending request: {:?}", request);

        let response = self.client.chat().create(request).await?;

        let mut response_string = String::new();
        for chat_choice in &response.choices {
            if let Some(ref content) = chat_choice.message.content {
                response_string.push_str(content);
            }
        }

        if response_string.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(response_string)
    }
}

#[cfg(test)]
pub mod mock {
    //! Scripted generator for unit tests.

    use super::*;
    use std::sync::Mutex;

    /// Returns queued responses in order and records every prompt and budget it sees.
    pub struct MockGenerator {
        responses: Mutex<Vec<Result<String, GenerationError>>>,
        pub calls: Mutex<Vec<(String, u32)>>,
    }

    impl MockGenerator {
        pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(GenerationError::EmptyResponse))
        }
    }
}
