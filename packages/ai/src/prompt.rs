//! Prompt templates for structured analysis and free-text prediction.

use command_center_feed_models::{Incident, Resource, WeatherSample};

/// System prompt for structured analysis.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a disaster management expert AI. Provide \
                                          precise, actionable insights for emergency response \
                                          coordination.";

/// System prompt for free-text prediction.
pub const PREDICTION_SYSTEM_PROMPT: &str =
    "You are a disaster prediction specialist. Provide accurate, data-driven predictions.";

const ANALYSIS_FORMAT: &str = r#"Please provide a structured analysis in the following JSON format:
{
  "riskAssessment": {
    "overallRisk": "low|medium|high|critical",
    "score": 0-100,
    "factors": ["factor1", "factor2", ...]
  },
  "recommendations": {
    "immediate": ["action1", "action2", ...],
    "shortTerm": ["action1", "action2", ...],
    "longTerm": ["action1", "action2", ...]
  },
  "resourceAllocation": {
    "priority": ["resource1", "resource2", ...],
    "suggestions": ["suggestion1", "suggestion2", ...]
  },
  "summary": "Comprehensive summary of the situation and key insights"
}

Respond with the JSON object only.

Focus on:
1. Risk level assessment based on incident severity and patterns
2. Resource deployment efficiency
3. Preventive measures
4. Emergency response optimization
5. Geographic distribution of incidents"#;

const PREDICTION_FOCUS: &str = "Provide a detailed prediction report focusing on:
1. Likelihood of specific disaster types
2. Geographical areas at risk
3. Timeline for potential events
4. Preventive measures";

/// Builds the user prompt for structured analysis.
///
/// # Errors
///
/// * If any of the inputs fail to serialize
pub fn analysis_prompt(
    incidents: &[Incident],
    resources: &[Resource],
    weather: Option<&WeatherSample>,
) -> Result<String, serde_json::Error> {
    let weather = match weather {
        Some(sample) => serde_json::to_string_pretty(sample)?,
        None => "Not available".to_string(),
    };

    Ok(format!(
        "You are an expert disaster management AI assistant. Analyze the following real-time \
         disaster data and provide comprehensive insights:\n\n\
         INCIDENTS DATA:\n{}\n\n\
         RESOURCES DATA:\n{}\n\n\
         WEATHER DATA:\n{weather}\n\n\
         {ANALYSIS_FORMAT}\n",
        serde_json::to_string_pretty(incidents)?,
        serde_json::to_string_pretty(resources)?,
    ))
}

/// Builds the user prompt for free-text prediction. Missing conditions are
/// sent as an empty object.
///
/// # Errors
///
/// * If any of the inputs fail to serialize
pub fn prediction_prompt(
    history: &[Incident],
    conditions: Option<&WeatherSample>,
) -> Result<String, serde_json::Error> {
    let conditions = match conditions {
        Some(sample) => serde_json::to_string_pretty(sample)?,
        None => "{}".to_string(),
    };

    Ok(format!(
        "Based on historical disaster data and current conditions, predict potential disaster \
         scenarios:\n\n\
         Historical Data: {}\n\
         Current Conditions: {conditions}\n\n\
         {PREDICTION_FOCUS}\n",
        serde_json::to_string_pretty(history)?,
    ))
}
