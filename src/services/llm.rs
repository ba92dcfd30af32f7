//! Inference service for note transforms and term definitions
//!
//! The core only needs one capability from a generative-text service: send
//! a system instruction plus one user turn, get text back. That capability
//! is the [`InferenceService`] trait; [`LlmService`] implements it against
//! the Anthropic Messages API.

use crate::config::{api_key_from_env, LlmSettings, NotewiseConfig};
use crate::error::{classify_upstream, NotewiseError, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One prompt sent to the inference service
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    /// Behavioral instruction block
    pub system: String,
    /// The single user turn
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
}

/// Opaque request/response capability of a generative-text service
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Send one prompt and return the reply text
    async fn complete(&self, request: InferenceRequest) -> Result<String>;

    /// Whether an access credential is configured
    fn has_credentials(&self) -> bool;
}

/// Configuration for LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Anthropic API key; None means every call fails with `Unauthenticated`
    pub api_key: Option<SecretString>,

    /// Base URL of the API (default: https://api.anthropic.com)
    pub api_base: String,

    /// Model to use (default: claude-3-5-haiku-20241022)
    pub model: String,

    /// Value of the `anthropic-version` header
    pub anthropic_version: String,
}

impl LlmConfig {
    /// Build from loaded settings plus the credential in the environment
    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self {
            api_key: api_key_from_env(),
            api_base: settings.api_base.clone(),
            model: settings.model.clone(),
            anthropic_version: settings.anthropic_version.clone(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from_settings(&NotewiseConfig::default().llm)
    }
}

/// Anthropic-backed inference service
pub struct LlmService {
    config: LlmConfig,
    client: reqwest::Client,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Anthropic error body: `{"type":"error","error":{"type":..,"message":..}}`
#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

impl LlmService {
    /// Create a new LLM service with custom config
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create with default config
    pub fn with_default() -> Self {
        Self::new(LlmConfig::default())
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl InferenceService for LlmService {
    async fn complete(&self, request: InferenceRequest) -> Result<String> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            NotewiseError::Unauthenticated(format!(
                "{} is not set",
                crate::config::API_KEY_ENV
            ))
        })?;

        debug!(
            "Calling Anthropic API (model: {}, max_tokens: {}, temperature: {})",
            self.config.model, request.max_tokens, request.temperature
        );

        let body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.user,
            }],
        };

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", &self.config.anthropic_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NotewiseError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<AnthropicErrorBody>(&error_text) {
                Ok(body) => format!("{}: {}", body.error.kind, body.error.message),
                Err(_) => error_text,
            };
            warn!("Anthropic API returned {}: {}", status, message);
            return Err(classify_upstream(Some(status.as_u16()), &message));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| NotewiseError::Upstream(format!("failed to read response: {}", e)))?;

        Ok(api_response
            .content
            .into_iter()
            .filter(|c| c.kind == "text")
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    fn has_credentials(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> LlmService {
        LlmService::new(LlmConfig {
            api_key: None,
            // Unroutable: the test fails loudly if a request is ever sent
            api_base: "http://127.0.0.1:9".to_string(),
            model: "claude-test".to_string(),
            anthropic_version: "2023-06-01".to_string(),
        })
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let service = unconfigured();
        assert!(!service.has_credentials());

        let result = service
            .complete(InferenceRequest {
                system: "s".to_string(),
                user: "u".to_string(),
                temperature: 0.0,
                max_tokens: 16,
            })
            .await;

        assert!(matches!(result, Err(NotewiseError::Unauthenticated(_))));
    }

    #[test]
    fn test_messages_url_trims_slash() {
        let mut service = unconfigured();
        service.config.api_base = "https://example.test/".to_string();
        assert_eq!(service.messages_url(), "https://example.test/v1/messages");
    }

    #[test]
    fn test_request_serialization() {
        let body = AnthropicRequest {
            model: "m",
            max_tokens: 10,
            temperature: 0.2,
            system: "sys",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn test_error_body_parses() {
        let raw = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let body: AnthropicErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(body.error.kind, "overloaded_error");
    }

    #[tokio::test]
    #[ignore] // Requires ANTHROPIC_API_KEY
    async fn test_live_completion() {
        let service = LlmService::with_default();
        let reply = service
            .complete(InferenceRequest {
                system: "Answer with one word.".to_string(),
                user: "What colour is the sky?".to_string(),
                temperature: 0.0,
                max_tokens: 16,
            })
            .await
            .unwrap();
        assert!(!reply.trim().is_empty());
    }
}
