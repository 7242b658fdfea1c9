/*!
 * Provider implementations for the translation model.
 *
 * This module contains client implementations for the supported LLM backends:
 * - OpenAI: any OpenAI-compatible chat completions endpoint
 * - Ollama: local LLM server
 * - Mock: scripted replies for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// One request to the translation model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// Instructions sent as the system message
    pub system_instructions: String,
    /// Serialized batch sent as the user message
    pub user_payload: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Ask the backend to constrain output to a JSON object
    pub json_mode: bool,
}

/// Raw reply from the translation model
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens, when reported
    pub prompt_tokens: Option<u64>,
    /// Completion tokens, when reported
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// Implementations only move text; decoding and validating the reply is the
/// caller's job.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

/// Build the configured provider
pub fn from_config(config: &TranslationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(
            config.get_endpoint(),
            config.api_key.clone(),
            config.timeout_secs,
        )?),
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(
            config.get_endpoint(),
            config.timeout_secs,
        )?),
    };
    Ok(provider)
}

pub mod mock;
pub mod ollama;
pub mod openai;
