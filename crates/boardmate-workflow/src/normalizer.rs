//! Error normalization — any failure becomes one channel message.
//!
//! Terminal stage on the error path: whatever error is present (or a fixed
//! fallback when none is) is rendered with the `❌ Error: ` prefix and
//! routed to delivery.  This stage itself cannot fail.

use crate::error::WorkflowError;

/// Message used when a stage routed here without recording an error.
const UNKNOWN_ERROR: &str = "unknown error";

/// Folds a [`WorkflowError`] into the single outgoing error message.
pub struct ErrorNormalizer;

impl ErrorNormalizer {
    /// Render the error (or the fixed fallback) as `❌ Error: …`.
    pub fn normalize(error: Option<&WorkflowError>) -> String {
        let message = error
            .map(|e| e.to_string())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
        format!("❌ Error: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_error_with_prefix() {
        let err = WorkflowError::lookup("Card 'X' not found in 'To Do'");
        assert_eq!(
            ErrorNormalizer::normalize(Some(&err)),
            "❌ Error: Card 'X' not found in 'To Do'"
        );
    }

    #[test]
    fn missing_error_falls_back() {
        assert_eq!(ErrorNormalizer::normalize(None), "❌ Error: unknown error");
    }
}
