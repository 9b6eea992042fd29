//! Gated analysis client.
//!
//! Both operations return `None` when no credential is configured and never
//! touch the provider in that case. Once the gate is open every failure is
//! absorbed: `analyze` yields [`AdvisoryResult::fallback`] and `predict`
//! yields [`PREDICTION_UNAVAILABLE`].

use std::sync::Arc;

use command_center_ai_models::AdvisoryResult;
use command_center_feed_models::{Incident, Snapshot, WeatherSample};

use crate::{
    AiError,
    config::{AiConfig, ai_configured},
    prompt::{
        ANALYSIS_SYSTEM_PROMPT, PREDICTION_SYSTEM_PROMPT, analysis_prompt, prediction_prompt,
    },
    providers::{ChatRequest, LlmProvider, create_provider},
    validate::parse_advisory,
};

/// Returned by `predict` when the provider call fails.
pub const PREDICTION_UNAVAILABLE: &str =
    "AI prediction service currently unavailable. Please check configuration.";

/// Returned by `predict` when the provider answers with no text.
pub const EMPTY_PREDICTION: &str = "Prediction unavailable";

const ANALYSIS_TEMPERATURE: f32 = 0.3;
const PREDICTION_TEMPERATURE: f32 = 0.2;
const PREDICTION_MAX_TOKENS: u32 = 800;

/// Sends snapshots to an LLM for structured analysis and prediction.
pub struct AnalysisClient {
    provider: Option<Arc<dyn LlmProvider>>,
    max_tokens: u32,
}

impl AnalysisClient {
    /// Creates a client around an existing provider. The provider is only
    /// retained if `config` carries a credential.
    #[must_use]
    pub fn new(config: &AiConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: config.is_configured().then_some(provider),
            max_tokens: config.max_tokens,
        }
    }

    /// Creates a client backed by the provider `config` selects. A missing
    /// credential yields a disabled client.
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        match create_provider(config) {
            Ok(provider) => {
                log::info!(
                    "Advisory analysis enabled: provider={} model={}",
                    config.provider,
                    config.model
                );
                Self {
                    provider: Some(provider),
                    max_tokens: config.max_tokens,
                }
            }
            Err(e) => {
                log::warn!("Advisory analysis disabled: {e}");
                Self::disabled()
            }
        }
    }

    /// Creates a client from the environment, consulting the process-wide
    /// [`ai_configured`] gate first. A closed gate never builds a provider.
    #[must_use]
    pub fn from_env() -> Self {
        if !ai_configured() {
            log::info!("Advisory analysis disabled: no AI credentials configured");
            return Self::disabled();
        }
        Self::from_config(&AiConfig::from_env())
    }

    /// Creates a client with the gate closed.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            provider: None,
            max_tokens: 0,
        }
    }

    /// Returns `true` if the capability gate is open.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Produces a structured advisory for `snapshot`.
    ///
    /// Returns `None` if the gate is closed, otherwise a validated result or
    /// the fallback.
    pub async fn analyze(&self, snapshot: &Snapshot) -> Option<AdvisoryResult> {
        let provider = self.provider.as_ref()?;

        match self.try_analyze(provider.as_ref(), snapshot).await {
            Ok(advisory) => {
                log::debug!(
                    "analyze: risk={} score={}",
                    advisory.risk_assessment.overall_risk,
                    advisory.risk_assessment.score
                );
                Some(advisory)
            }
            Err(e) => {
                log::error!("Advisory analysis failed, using fallback: {e}");
                Some(AdvisoryResult::fallback())
            }
        }
    }

    async fn try_analyze(
        &self,
        provider: &dyn LlmProvider,
        snapshot: &Snapshot,
    ) -> Result<AdvisoryResult, AiError> {
        let request = ChatRequest {
            system: ANALYSIS_SYSTEM_PROMPT.to_string(),
            user: analysis_prompt(
                &snapshot.incidents,
                &snapshot.resources,
                snapshot.weather.as_ref(),
            )?,
            max_tokens: self.max_tokens,
            temperature: ANALYSIS_TEMPERATURE,
        };

        let content = provider.complete(&request).await?;
        if content.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }

        parse_advisory(&content)
    }

    /// Produces a free-text prediction from incident history and current
    /// conditions.
    ///
    /// Returns `None` if the gate is closed.
    pub async fn predict(
        &self,
        history: &[Incident],
        conditions: Option<&WeatherSample>,
    ) -> Option<String> {
        let provider = self.provider.as_ref()?;

        let result = match prediction_prompt(history, conditions) {
            Ok(user) => {
                let request = ChatRequest {
                    system: PREDICTION_SYSTEM_PROMPT.to_string(),
                    user,
                    max_tokens: PREDICTION_MAX_TOKENS,
                    temperature: PREDICTION_TEMPERATURE,
                };
                provider.complete(&request).await
            }
            Err(e) => Err(e.into()),
        };

        Some(match result {
            Ok(text) if text.is_empty() => EMPTY_PREDICTION.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::error!("Prediction failed: {e}");
                PREDICTION_UNAVAILABLE.to_string()
            }
        })
    }
}
