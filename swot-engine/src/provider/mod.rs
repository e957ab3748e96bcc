//! Language-model provider abstraction.
//!
//! Provides a unified interface for the chat-completion call the analysis
//! pipeline makes, with one configured provider built at startup and shared
//! behind `Arc<dyn Provider>` (no process-wide client handle).

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use swot_common::config::ProviderConfig;
use swot_common::error::Error;

// ============================================================================
// Provider Trait
// ============================================================================

/// Unified interface for LLM providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Send a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Error from a provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider, self.model, self.message)
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Error::Provider(err.to_string())
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Unified chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model to use
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    /// Temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// System prompt (if not in messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Unified chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Provider name
    pub provider: String,
    /// Model used
    pub model: String,
    /// Response content
    pub content: String,
    /// Token usage
    pub usage: TokenUsage,
    /// Finish reason
    pub finish_reason: Option<String>,
    /// Response latency in milliseconds
    pub latency_ms: u64,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
}

// ============================================================================
// Construction
// ============================================================================

/// Build the configured provider.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>, Error> {
    match config.kind.as_str() {
        "openai" => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    Error::Config("provider.api_key is required for the openai provider".into())
                })?;
            Ok(Arc::new(OpenAiProvider::new(
                api_key,
                config.base_url.as_deref(),
                config.timeout_secs,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaProvider::new(
            config.base_url.as_deref(),
            config.timeout_secs,
        ))),
        other => Err(Error::Config(format!(
            "Unknown provider kind '{other}' (expected openai or ollama)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![Message {
                role: "user".into(),
                content: "Hello".into(),
            }],
            max_tokens: Some(1000),
            temperature: None,
            system: Some("You are a strategy analyst.".into()),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("strategy analyst"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_build_provider_openai_requires_key() {
        let config = ProviderConfig::default();
        assert!(build_provider(&config).is_err());

        let config = ProviderConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_build_provider_ollama() {
        let config = ProviderConfig {
            kind: "ollama".into(),
            ..Default::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_build_provider_unknown_kind() {
        let config = ProviderConfig {
            kind: "telepathy".into(),
            ..Default::default()
        };
        assert!(build_provider(&config).is_err());
    }
}
