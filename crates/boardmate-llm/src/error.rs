//! LLM error types.
//!
//! All failures in this crate surface through [`LlmError`].  Each variant
//! carries enough context for callers to decide how to handle the failure
//! without inspecting opaque strings.

/// Unified error type for the LLM client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    /// An HTTP request to the LLM provider failed.
    #[error("llm request failed: {reason}")]
    RequestFailed { reason: String },

    /// The provider response could not be parsed into the expected shape.
    #[error("llm response parse error: {reason}")]
    ParseFailed { reason: String },
}

/// Convenience alias used throughout the LLM crate.
pub type Result<T> = std::result::Result<T, LlmError>;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}
