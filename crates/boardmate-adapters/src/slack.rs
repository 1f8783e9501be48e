//! Slack Web API client.
//!
//! Implements the [`MessageDelivery`] trait over `chat.postMessage`.
//! Slack reports API-level failures inside a 200 response body
//! (`{"ok": false, "error": "..."}`), so both the HTTP status and the `ok`
//! field are checked.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{AdapterError, Result};
use crate::traits::MessageDelivery;

/// Default Slack Web API base URL.
const DEFAULT_BASE_URL: &str = "https://slack.com/api";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for the Slack Web API.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`).
    pub bot_token: String,
    /// Base URL for the API (default: `https://slack.com/api`).
    pub base_url: String,
}

impl SlackConfig {
    /// Create a configuration with the default API URL.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Read the configuration from `SLACK_BOT_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let bot_token =
            std::env::var("SLACK_BOT_TOKEN").map_err(|_| AdapterError::MissingCredential {
                provider: "slack".into(),
                env_var: "SLACK_BOT_TOKEN".into(),
            })?;
        Ok(Self::new(bot_token))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Slack message-delivery client.
pub struct SlackClient {
    config: SlackConfig,
    http: reqwest::Client,
}

impl SlackClient {
    /// Create a new client from a configuration.
    pub fn new(config: SlackConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("boardmate/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Check the `ok` field of a Slack Web API response body.
    fn check_ok(body: &Value, operation: &str) -> Result<()> {
        let ok = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
        if ok {
            return Ok(());
        }
        let reason = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_owned();
        Err(AdapterError::Rejected {
            operation: operation.into(),
            reason,
        })
    }
}

#[async_trait]
impl MessageDelivery for SlackClient {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let url = format!(
            "{}/chat.postMessage",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({ "channel": channel_id, "text": text });

        debug!(url = %url, channel_id, "posting message");

        let response = self
            .http
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.bot_token),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::RequestFailed {
                operation: "post_message".into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Slack API error");
            return Err(AdapterError::UnexpectedStatus {
                operation: "post_message".into(),
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value =
            response
                .json()
                .await
                .map_err(|e| AdapterError::InvalidResponse {
                    operation: "post_message".into(),
                    reason: format!("body is not valid JSON: {e}"),
                })?;

        Self::check_ok(&body, "post_message")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
