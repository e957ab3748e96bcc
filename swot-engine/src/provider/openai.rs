//! OpenAI provider implementation.

use super::{ChatRequest, ChatResponse, Message, Provider, ProviderError, TokenUsage};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// OpenAI API provider (also covers Azure/compatible endpoints via a custom
/// base URL).
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider.
    ///
    /// `base_url` defaults to the public API when not given.
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>, timeout_secs: u64) -> Self {
        let api_key = api_key.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url
                .unwrap_or("https://api.openai.com")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        // Convert to OpenAI format
        let mut messages: Vec<OpenAiMessage> = request
            .messages
            .iter()
            .map(|m: &Message| OpenAiMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect();

        // Add system message if provided
        if let Some(system) = &request.system {
            messages.insert(
                0,
                OpenAiMessage {
                    role: "system".into(),
                    content: system.clone(),
                },
            );
        }

        let openai_request = OpenAiRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| ProviderError {
                provider: "openai".into(),
                model: request.model.clone(),
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError {
                provider: "openai".into(),
                model: request.model,
                message: format!("API error: {}", body),
                status_code: Some(status.as_u16()),
            });
        }

        let openai_response: OpenAiResponse = response.json().await.map_err(|e| ProviderError {
            provider: "openai".into(),
            model: request.model.clone(),
            message: format!("Failed to parse response: {}", e),
            status_code: None,
        })?;

        // Extract content from first choice
        let content = openai_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        let finish_reason = openai_response
            .choices
            .first()
            .and_then(|c| c.finish_reason.clone());

        Ok(ChatResponse {
            provider: "openai".into(),
            model: openai_response.model,
            content,
            usage: TokenUsage {
                input_tokens: openai_response.usage.prompt_tokens,
                output_tokens: openai_response.usage.completion_tokens,
                total_tokens: openai_response.usage.total_tokens,
            },
            finish_reason,
            latency_ms,
        })
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: OpenAiUsage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let provider = OpenAiProvider::new("test-key", Some("https://example.test/"), 30);
        assert_eq!(provider.base_url, "https://example.test");

        let provider = OpenAiProvider::new("test-key", None, 30);
        assert_eq!(provider.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_openai_request_serialization() {
        let request = OpenAiRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![
                OpenAiMessage {
                    role: "system".into(),
                    content: "Be terse".into(),
                },
                OpenAiMessage {
                    role: "user".into(),
                    content: "Hello".into(),
                },
            ],
            max_tokens: Some(1000),
            temperature: Some(0.2),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("Be terse"));
    }

    #[test]
    fn test_response_parsing_tolerates_missing_usage() {
        let body = r#"{
            "model": "gpt-4o-mini",
            "choices": [
                { "message": { "content": "{}" }, "finish_reason": "stop" }
            ]
        }"#;
        let parsed: OpenAiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.usage.total_tokens, 0);
        assert_eq!(parsed.choices[0].message.content, "{}");
    }
}
