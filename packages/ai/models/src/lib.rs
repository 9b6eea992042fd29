#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Advisory result types produced by the analysis client.
//!
//! The JSON shape matches what the model is asked to return, so a valid
//! reply deserializes straight into [`AdvisoryResult`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Overall risk level of the current situation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RiskLevel {
    /// Situation under control.
    Low,
    /// Elevated, needs attention.
    Medium,
    /// Serious, needs coordinated response.
    High,
    /// Life-threatening across the region.
    Critical,
}

/// Overall risk with its contributing factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Overall risk level.
    pub overall_risk: RiskLevel,
    /// Risk score, 0-100.
    pub score: u8,
    /// What drives the risk.
    pub factors: Vec<String>,
}

/// Recommended actions partitioned by horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// Do now.
    pub immediate: Vec<String>,
    /// Do within hours to days.
    pub short_term: Vec<String>,
    /// Do over weeks to months.
    pub long_term: Vec<String>,
}

/// Resource deployment guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    /// Resources to prioritize.
    pub priority: Vec<String>,
    /// Deployment suggestions.
    pub suggestions: Vec<String>,
}

/// Structured risk guidance for a snapshot. Replaced, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryResult {
    /// Overall risk and factors.
    pub risk_assessment: RiskAssessment,
    /// Recommended actions.
    pub recommendations: Recommendations,
    /// Resource guidance.
    pub resource_allocation: ResourceAllocation,
    /// Free-text situation summary.
    pub summary: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl AdvisoryResult {
    /// The fixed result returned whenever analysis fails. It does not
    /// depend on the input snapshot.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            risk_assessment: RiskAssessment {
                overall_risk: RiskLevel::Medium,
                score: 50,
                factors: strings(&["Limited AI analysis available", "Manual review required"]),
            },
            recommendations: Recommendations {
                immediate: strings(&["Review incidents manually", "Deploy available resources"]),
                short_term: strings(&["Set up AI configuration", "Monitor situation closely"]),
                long_term: strings(&[
                    "Implement AI-powered monitoring",
                    "Enhance prediction capabilities",
                ]),
            },
            resource_allocation: ResourceAllocation {
                priority: strings(&["Emergency services", "Medical teams"]),
                suggestions: strings(&[
                    "Optimize resource distribution",
                    "Maintain readiness levels",
                ]),
            },
            summary: "AI analysis currently unavailable. Please configure an AI provider API key \
                      for advanced insights."
                .to_string(),
        }
    }
}
