//! Adapter error types.
//!
//! All adapter failures surface through [`AdapterError`].  Each variant
//! carries enough context for callers to decide how to handle the failure
//! without inspecting opaque strings.

/// Unified error type for boardmate adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A required credential was not configured.
    #[error("missing credential for `{provider}`: set {env_var}")]
    MissingCredential {
        provider: String,
        env_var: String,
    },

    /// An HTTP request failed before a response was received.
    #[error("request failed during `{operation}`: {reason}")]
    RequestFailed { operation: String, reason: String },

    /// The remote service answered with a non-success status.
    #[error("`{operation}` returned {status}: {message}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("invalid response during `{operation}`: {reason}")]
    InvalidResponse { operation: String, reason: String },

    /// The remote service accepted the request but reported failure at the
    /// API level (e.g. Slack `ok: false`).
    #[error("`{operation}` rejected by the service: {reason}")]
    Rejected { operation: String, reason: String },
}

/// Convenience alias used throughout the adapters crate.
pub type Result<T> = std::result::Result<T, AdapterError>;
