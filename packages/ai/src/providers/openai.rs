//! `OpenAI` chat completions provider.
//!
//! Also works against any `OpenAI`-compatible server when a base URL is
//! configured.

use serde::{Deserialize, Serialize};

use super::{ChatRequest, LlmProvider, REQUEST_TIMEOUT};
use crate::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    #[must_use]
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: [OpenAiMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// Maps a non-2xx response to [`AiError::Provider`], preferring the API's
/// own error message.
fn error_from_body(status: reqwest::StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<OpenAiError>(body)
        .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
    AiError::Provider { message }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError> {
        let body = OpenAiRequest {
            model: &self.model,
            messages: [
                OpenAiMessage {
                    role: "system",
                    content: &request.system,
                },
                OpenAiMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let response: OpenAiResponse = serde_json::from_str(&body)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::Provider {
                message: "No choices in OpenAI response".to_string(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_respects_base_url() {
        let default = OpenAiProvider::new("k".to_string(), "m".to_string(), None);
        assert_eq!(
            default.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );

        let local = OpenAiProvider::new(
            "k".to_string(),
            "m".to_string(),
            Some("http://localhost:11434/v1/".to_string()),
        );
        assert_eq!(local.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn response_content_decodes() {
        let response: OpenAiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn error_body_becomes_provider_error() {
        let err = error_from_body(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        );
        assert!(
            matches!(err, AiError::Provider { ref message } if message == "Incorrect API key provided")
        );

        let err = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(
            matches!(err, AiError::Provider { ref message } if message == "HTTP 502 Bad Gateway: upstream down")
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        let provider = OpenAiProvider::new(
            "k".to_string(),
            "m".to_string(),
            Some("http://127.0.0.1:1".to_string()),
        );
        let request = ChatRequest {
            system: "s".to_string(),
            user: "u".to_string(),
            max_tokens: 10,
            temperature: 0.0,
        };

        let err = provider.complete(&request).await.unwrap_err();
        assert!(matches!(err, AiError::Http(_)));
    }
}
