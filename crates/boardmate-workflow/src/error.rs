//! Workflow error taxonomy.
//!
//! Every stage converts its failures into a [`WorkflowError`] whose
//! `Display` is the exact human-readable message that reaches the channel
//! (the normalizer only adds the `❌ Error: ` prefix).  The variant records
//! which stage of the pipeline failed.

/// A failure somewhere in the intent-routing pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
    /// The language-model output could not be decoded into an intent.
    #[error("{message}")]
    Parse { message: String },

    /// A required parameter is missing or the intent is unrecognized.
    #[error("{message}")]
    Validation { message: String },

    /// A named board, list, or card was not found.
    #[error("{message}")]
    Lookup { message: String },

    /// A task-board call failed or returned an unexpected status.
    #[error("{message}")]
    Remote { message: String },

    /// The final message send failed.
    #[error("{message}")]
    Delivery { message: String },
}

impl WorkflowError {
    /// Build a [`WorkflowError::Parse`].
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Build a [`WorkflowError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a [`WorkflowError::Lookup`].
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    /// Build a [`WorkflowError::Remote`].
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Build a [`WorkflowError::Delivery`].
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Short category tag used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::Lookup { .. } => "lookup",
            Self::Remote { .. } => "remote",
            Self::Delivery { .. } => "delivery",
        }
    }
}

/// Convenience alias used throughout the workflow crate.
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = WorkflowError::lookup("Card 'X' not found in 'To Do'");
        assert_eq!(err.to_string(), "Card 'X' not found in 'To Do'");
        assert_eq!(err.kind(), "lookup");
    }
}
