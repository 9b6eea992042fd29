//! Decoding and validation of the model's structured reply.
//!
//! The reply is untrusted. It is decoded into a loose wire shape first,
//! then normalized into an [`AdvisoryResult`]: the risk level must be one
//! of the known values, the score must be a finite number (clamped to
//! 0-100), blank list entries are dropped, and the summary must not be
//! blank.

use command_center_ai_models::{
    AdvisoryResult, Recommendations, ResourceAllocation, RiskAssessment, RiskLevel,
};
use serde::Deserialize;

use crate::AiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdvisory {
    risk_assessment: RawRiskAssessment,
    #[serde(default)]
    recommendations: RawRecommendations,
    #[serde(default)]
    resource_allocation: RawResourceAllocation,
    summary: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRiskAssessment {
    overall_risk: String,
    score: f64,
    #[serde(default)]
    factors: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecommendations {
    #[serde(default)]
    immediate: Vec<String>,
    #[serde(default)]
    short_term: Vec<String>,
    #[serde(default)]
    long_term: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResourceAllocation {
    #[serde(default)]
    priority: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Removes a surrounding markdown code fence, if any.
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening line.
    body.split_once('\n').map_or(body, |(_, inner)| inner).trim()
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Clamps a score to 0-100 and rounds it.
///
/// # Errors
///
/// * If the score is `NaN` or infinite
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize_score(score: f64) -> Result<u8, AiError> {
    if !score.is_finite() {
        return Err(AiError::Validation {
            message: format!("score is not a finite number: {score}"),
        });
    }

    Ok(score.clamp(0.0, 100.0).round() as u8)
}

/// Decodes and validates a raw model reply.
///
/// # Errors
///
/// * [`AiError::Json`] if the reply is not the expected JSON shape
/// * [`AiError::Validation`] if a field has an unacceptable value
pub fn parse_advisory(content: &str) -> Result<AdvisoryResult, AiError> {
    let raw: RawAdvisory = serde_json::from_str(strip_code_fence(content))?;

    let overall_risk = raw
        .risk_assessment
        .overall_risk
        .trim()
        .parse::<RiskLevel>()
        .map_err(|_| AiError::Validation {
            message: format!(
                "unknown risk level: '{}'",
                raw.risk_assessment.overall_risk
            ),
        })?;

    let summary = raw.summary.trim().to_string();
    if summary.is_empty() {
        return Err(AiError::Validation {
            message: "summary is blank".to_string(),
        });
    }

    Ok(AdvisoryResult {
        risk_assessment: RiskAssessment {
            overall_risk,
            score: normalize_score(raw.risk_assessment.score)?,
            factors: clean(raw.risk_assessment.factors),
        },
        recommendations: Recommendations {
            immediate: clean(raw.recommendations.immediate),
            short_term: clean(raw.recommendations.short_term),
            long_term: clean(raw.recommendations.long_term),
        },
        resource_allocation: ResourceAllocation {
            priority: clean(raw.resource_allocation.priority),
            suggestions: clean(raw.resource_allocation.suggestions),
        },
        summary,
    })
}
