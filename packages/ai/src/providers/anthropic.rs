//! Anthropic Claude provider implementation.

use serde::{Deserialize, Serialize};

use super::{ChatRequest, LlmProvider, REQUEST_TIMEOUT};
use crate::AiError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic Claude API provider.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider.
    #[must_use]
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

/// Anthropic API request body.
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic API response body.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Anthropic API error response.
#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

fn collect_text(blocks: Vec<AnthropicContentBlock>) -> String {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text),
            AnthropicContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn error_from_body(status: reqwest::StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<AnthropicError>(body)
        .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
    AiError::Provider { message }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError> {
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: [AnthropicMessage {
                role: "user",
                content: &request.user,
            }],
        };

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let response: AnthropicResponse = serde_json::from_str(&body)?;

        Ok(collect_text(response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_blocks_are_joined_and_others_skipped() {
        let response: AnthropicResponse = serde_json::from_str(
            r#"{"content":[
                {"type":"text","text":"first"},
                {"type":"thinking","thinking":"hidden"},
                {"type":"text","text":"second"}
            ],"stop_reason":"end_turn"}"#,
        )
        .unwrap();

        assert_eq!(collect_text(response.content), "first\nsecond");
    }

    #[test]
    fn error_body_becomes_provider_error() {
        let err = error_from_body(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"Number of requests has exceeded your rate limit"}}"#,
        );
        assert!(matches!(
            err,
            AiError::Provider { ref message }
                if message == "Number of requests has exceeded your rate limit"
        ));

        let err = error_from_body(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(
            err,
            AiError::Provider { ref message }
                if message == "HTTP 500 Internal Server Error: <html>oops</html>"
        ));
    }
}
