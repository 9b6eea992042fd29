//! LLM provider abstraction and implementations.
//!
//! Supports `OpenAI` and Anthropic Claude via a common trait. Each provider
//! performs a single system + user exchange and returns the reply text.

pub mod anthropic;
pub mod openai;

use std::{sync::Arc, time::Duration};

use crate::{
    AiError,
    config::{AiConfig, ProviderKind},
};

/// Upper bound on a single provider round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System prompt establishing the model's role.
    pub system: String,
    /// User prompt carrying the data.
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends `request` and returns the reply text, which may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails, the provider answers with a
    /// non-2xx status, or the response body cannot be decoded.
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError>;
}

/// Creates the provider selected by `config`.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no API key is configured.
pub fn create_provider(config: &AiConfig) -> Result<Arc<dyn LlmProvider>, AiError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AiError::Config {
            message: format!(
                "{} environment variable not set",
                config.provider.api_key_var()
            ),
        })?;

    Ok(match config.provider {
        ProviderKind::OpenAi => Arc::new(openai::OpenAiProvider::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
        )),
        ProviderKind::Anthropic => Arc::new(anthropic::AnthropicProvider::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_config_error() {
        let config = AiConfig::new(ProviderKind::Anthropic, None);
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, AiError::Config { ref message } if message.contains("ANTHROPIC_API_KEY")));
    }

    #[test]
    fn configured_key_builds_provider() {
        let config = AiConfig::new(ProviderKind::OpenAi, Some("sk-test".to_string()));
        assert!(create_provider(&config).is_ok());
    }
}
