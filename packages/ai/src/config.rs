//! Provider configuration and the capability gate.
//!
//! The gate is closed unless an API key is configured for the selected
//! provider. A closed gate disables analysis entirely; it is not a runtime
//! failure.

use std::sync::OnceLock;

use strum_macros::{AsRefStr, Display, EnumString};

const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Which LLM API to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum ProviderKind {
    /// `OpenAI` chat completions, or any compatible server.
    #[strum(serialize = "openai", serialize = "gpt")]
    OpenAi,
    /// Anthropic messages API.
    #[strum(serialize = "anthropic", serialize = "claude")]
    Anthropic,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Model used when `AI_MODEL` is unset.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

/// Settings for the advisory client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// Selected provider.
    pub provider: ProviderKind,
    /// Credential. `None` closes the capability gate.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Token budget for structured analysis.
    pub max_tokens: u32,
    /// Override for the provider's API base URL.
    pub base_url: Option<String>,
}

impl AiConfig {
    /// Reads configuration from the environment.
    ///
    /// If `AI_PROVIDER` is set to a known provider it is used. Otherwise the
    /// provider is detected from available credentials (`OPENAI_API_KEY`
    /// first, then `ANTHROPIC_API_KEY`), defaulting to `OpenAI` with the
    /// gate closed. `AI_MODEL`, `AI_MAX_TOKENS` and `AI_BASE_URL` override
    /// the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let provider = std::env::var("AI_PROVIDER")
            .ok()
            .and_then(|p| {
                p.parse::<ProviderKind>()
                    .inspect_err(|_| {
                        log::warn!("Unknown AI_PROVIDER '{p}', detecting from credentials");
                    })
                    .ok()
            })
            .unwrap_or_else(detect_provider);

        Self {
            provider,
            api_key: non_empty_var(provider.api_key_var()),
            model: non_empty_var("AI_MODEL")
                .unwrap_or_else(|| provider.default_model().to_string()),
            max_tokens: std::env::var("AI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            base_url: non_empty_var("AI_BASE_URL"),
        }
    }

    /// Creates a configuration with defaults for `provider`.
    #[must_use]
    pub fn new(provider: ProviderKind, api_key: Option<String>) -> Self {
        Self {
            provider,
            api_key,
            model: provider.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
        }
    }

    /// Returns `true` if a credential is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Process-wide capability check, evaluated once from the environment.
#[must_use]
pub fn ai_configured() -> bool {
    static CONFIGURED: OnceLock<bool> = OnceLock::new();
    *CONFIGURED.get_or_init(|| AiConfig::from_env().is_configured())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn detect_provider() -> ProviderKind {
    if non_empty_var("OPENAI_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return ProviderKind::OpenAi;
    }

    if non_empty_var("ANTHROPIC_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return ProviderKind::Anthropic;
    }

    log::warn!(
        "No AI credentials detected. Set OPENAI_API_KEY or ANTHROPIC_API_KEY to enable \
         advisory analysis."
    );

    ProviderKind::OpenAi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_aliases_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("gpt".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            "claude".parse::<ProviderKind>().unwrap(),
            ProviderKind::Anthropic
        );
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn blank_key_closes_gate() {
        assert!(!AiConfig::new(ProviderKind::OpenAi, None).is_configured());
        assert!(!AiConfig::new(ProviderKind::OpenAi, Some("  ".to_string())).is_configured());
        assert!(AiConfig::new(ProviderKind::OpenAi, Some("sk-test".to_string())).is_configured());
    }

    #[test]
    fn defaults_follow_provider() {
        let config = AiConfig::new(ProviderKind::Anthropic, None);
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn process_gate_matches_environment_and_is_stable() {
        let first = ai_configured();
        assert_eq!(first, AiConfig::from_env().is_configured());
        assert_eq!(ai_configured(), first);
    }
}
