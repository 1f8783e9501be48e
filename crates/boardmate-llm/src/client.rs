//! Multi-provider LLM client.
//!
//! Supports the **Anthropic Messages API** and the **OpenAI Chat Completions
//! API** (including OpenAI-compatible endpoints such as Ollama, Together, and
//! vLLM), non-streaming only.  The workflow engine consumes this client
//! through the [`TextCompleter`] trait so tests can substitute a scripted
//! backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, Role};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default Anthropic API base URL.
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One-shot text completion.
///
/// The only capability the workflow core needs from a language model: send a
/// prompt, get text back.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Complete a single prompt and return the raw model text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextCompleter for Arc<dyn TextCompleter> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

// ---------------------------------------------------------------------------
// Provider enum
// ---------------------------------------------------------------------------

/// Identifies which LLM provider the client should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Anthropic Messages API.
    Anthropic,
    /// OpenAI Chat Completions API (also covers OpenAI-compatible endpoints).
    OpenAI,
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to a single LLM provider endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Which provider this configuration targets.
    pub provider: LlmProvider,
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (e.g. `https://api.anthropic.com`).
    pub base_url: String,
    /// Default model identifier.
    pub default_model: String,
    /// Default maximum tokens per response.
    pub max_tokens: u32,
}

impl LlmClientConfig {
    /// Create a configuration for the Anthropic Claude API.
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_owned(),
            default_model: model.into(),
            max_tokens: 1024,
        }
    }

    /// Create a configuration for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            default_model: model.into(),
            max_tokens: 1024,
        }
    }

    /// Create a configuration for any OpenAI-compatible API (e.g. Ollama,
    /// Together, vLLM).
    pub fn openai_compatible(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: api_key.into(),
            base_url: base_url.into(),
            default_model: model.into(),
            max_tokens: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An LLM client that communicates with either the Anthropic Messages API or
/// the OpenAI Chat Completions API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: Arc<LlmClientConfig>,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            let provider_name = match config.provider {
                LlmProvider::Anthropic => "anthropic",
                LlmProvider::OpenAI => "openai",
            };
            return Err(LlmError::MissingApiKey {
                provider: provider_name.into(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent("boardmate/0.1")
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Send a chat request and return the model's text answer.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        match self.config.provider {
            LlmProvider::Anthropic => self.chat_anthropic(request).await,
            LlmProvider::OpenAI => self.chat_openai(request).await,
        }
    }

    /// Resolve the model to use for a request.
    fn resolve_model(&self, request: &ChatRequest) -> String {
        if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Anthropic implementation
    // -----------------------------------------------------------------------

    async fn chat_anthropic(&self, request: &ChatRequest) -> Result<String> {
        let body = self.build_anthropic_body(request);
        let url = format!("{}/v1/messages", self.config.base_url);

        debug!(url = %url, model = %self.resolve_model(request), "sending Anthropic request");

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| LlmError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(LlmError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| LlmError::ParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;
        Self::extract_anthropic_text(&v)
    }

    /// Build the Anthropic Messages API request body.  System messages are
    /// lifted into the top-level `system` field.
    fn build_anthropic_body(&self, request: &ChatRequest) -> Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::User => "user",
                        _ => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.resolve_model(request),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages,
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }
        body
    }

    /// Pull the concatenated text blocks out of an Anthropic response body.
    fn extract_anthropic_text(v: &Value) -> Result<String> {
        let blocks = v
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| LlmError::ParseFailed {
                reason: "response has no `content` array".into(),
            })?;

        let text: String = blocks
            .iter()
            .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            return Err(LlmError::ParseFailed {
                reason: "response contains no text blocks".into(),
            });
        }
        Ok(text)
    }

    // -----------------------------------------------------------------------
    // OpenAI implementation
    // -----------------------------------------------------------------------

    async fn chat_openai(&self, request: &ChatRequest) -> Result<String> {
        let body = self.build_openai_body(request);
        let url = format!("{}/chat/completions", self.config.base_url);

        debug!(url = %url, model = %self.resolve_model(request), "sending OpenAI request");

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| LlmError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(LlmError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| LlmError::ParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;
        Self::extract_openai_text(&v)
    }

    /// Build the OpenAI Chat Completions request body.
    fn build_openai_body(&self, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.resolve_model(request),
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
        });
        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }
        body
    }

    /// Pull the first choice's message content out of an OpenAI response body.
    fn extract_openai_text(v: &Value) -> Result<String> {
        v.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .map(str::to_owned)
            .ok_or_else(|| LlmError::ParseFailed {
                reason: "response has no `choices[0].message.content`".into(),
            })
    }
}

#[async_trait]
impl TextCompleter for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(&ChatRequest::from_prompt(prompt)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn empty_api_key_rejected() {
        let config = LlmClientConfig::anthropic("", "claude-sonnet-4-20250514");
        assert!(matches!(
            LlmClient::new(config),
            Err(LlmError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn anthropic_body_lifts_system_messages() {
        let client =
            LlmClient::new(LlmClientConfig::anthropic("key", "claude-sonnet-4-20250514")).unwrap();
        let request = ChatRequest {
            model: String::new(),
            messages: vec![Message::system("be terse"), Message::user("hello")],
            temperature: Some(0.0),
            max_tokens: Some(64),
        };
        let body = client.build_anthropic_body(&request);
        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn openai_body_keeps_system_inline() {
        let client = LlmClient::new(LlmClientConfig::openai("key", "gpt-4o-mini")).unwrap();
        let request = ChatRequest {
            model: String::new(),
            messages: vec![Message::system("be terse"), Message::user("hello")],
            temperature: None,
            max_tokens: None,
        };
        let body = client.build_openai_body(&request);
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[test]
    fn extract_anthropic_text_concatenates_blocks() {
        let v = serde_json::json!({
            "content": [
                {"type": "text", "text": "hello "},
                {"type": "text", "text": "world"}
            ]
        });
        assert_eq!(LlmClient::extract_anthropic_text(&v).unwrap(), "hello world");
    }

    #[test]
    fn extract_anthropic_text_rejects_empty() {
        let v = serde_json::json!({"content": []});
        assert!(LlmClient::extract_anthropic_text(&v).is_err());
    }

    #[test]
    fn extract_openai_text_reads_first_choice() {
        let v = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}]
        });
        assert_eq!(LlmClient::extract_openai_text(&v).unwrap(), "hi");
    }

    #[test]
    fn extract_openai_text_rejects_missing_choices() {
        let v = serde_json::json!({"object": "chat.completion"});
        assert!(LlmClient::extract_openai_text(&v).is_err());
    }

    #[test]
    fn from_prompt_builds_single_user_turn() {
        let request = ChatRequest::from_prompt("do the thing");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.temperature, Some(0.0));
    }
}
