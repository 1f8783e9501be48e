//! Server configuration, read once from the environment at startup.
//!
//! Credentials for the collaborator clients are loaded by their own
//! `from_env` constructors; this module only owns what the server itself
//! needs plus the language-model selection.

use boardmate_llm::LlmClientConfig;

use crate::ServerError;

/// Default bind address when `BOARDMATE_BIND` is unset.
const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Default Anthropic model when `LLM_MODEL` is unset.
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Default OpenAI model when `LLM_MODEL` is unset.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Settings the server reads at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind: String,
    /// Slack signing secret used to authenticate inbound requests.
    pub signing_secret: String,
    /// Board the workflow operates on when a command names none.
    pub default_board_id: String,
    /// Language-model endpoint configuration.
    pub llm: LlmClientConfig,
}

impl ServerConfig {
    /// Load the configuration from the process environment.
    ///
    /// `LLM_PROVIDER` selects the backend (`anthropic`, the default, or
    /// `openai`); the matching `*_API_KEY` variable must be set.
    pub fn from_env() -> Result<Self, ServerError> {
        let llm = match std::env::var("LLM_PROVIDER").as_deref() {
            Ok("openai") => LlmClientConfig::openai(
                require("OPENAI_API_KEY")?,
                var_or("LLM_MODEL", DEFAULT_OPENAI_MODEL),
            ),
            _ => LlmClientConfig::anthropic(
                require("ANTHROPIC_API_KEY")?,
                var_or("LLM_MODEL", DEFAULT_ANTHROPIC_MODEL),
            ),
        };

        Ok(Self {
            bind: var_or("BOARDMATE_BIND", DEFAULT_BIND),
            signing_secret: require("SLACK_SIGNING_SECRET")?,
            default_board_id: require("TRELLO_BOARD_ID")?,
            llm,
        })
    }
}

fn require(var: &str) -> Result<String, ServerError> {
    std::env::var(var).map_err(|_| ServerError::MissingEnv { var: var.into() })
}

fn var_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_owned())
}
