//! Intent parsing — raw text to typed intent via one generative-language
//! call.
//!
//! The parser prompts the model for a strict JSON object
//! `{"intent": ..., "details": {...}}`, then extracts the span between the
//! first `{` and the last `}` so surrounding prose or code fences do not
//! break decoding.  A bounded number of attempts is made before declaring
//! failure; parameter *contents* are never validated here — that is the
//! dispatcher's job.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use boardmate_llm::TextCompleter;

use crate::error::{Result, WorkflowError};

/// Attempts made against the language model before giving up.
const DEFAULT_MAX_ATTEMPTS: u32 = 2;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// The classified action a user's text requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Show the cards of one list.
    ShowCards,
    /// Move a card between two lists.
    MoveCard,
    /// Create a card in a list.
    CreateCard,
    /// List all visible boards.
    ListBoards,
    /// Generate an activity report.
    GenerateReport,
    /// Anything the model could not map to a known action.
    Unknown,
}

impl Intent {
    /// Map a wire tag produced by the language model onto an intent.
    /// Unrecognized tags become [`Intent::Unknown`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "show_cards" => Self::ShowCards,
            "move_card" => Self::MoveCard,
            "create_card" => Self::CreateCard,
            "list_boards" => Self::ListBoards,
            "generate_report" => Self::GenerateReport,
            _ => Self::Unknown,
        }
    }

    /// The wire tag for this intent.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::ShowCards => "show_cards",
            Self::MoveCard => "move_card",
            Self::CreateCard => "create_card",
            Self::ListBoards => "list_boards",
            Self::GenerateReport => "generate_report",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

const INTENT_PROMPT: &str = r#"You are the command parser for a task-board assistant.
Classify the user's message into exactly one intent and extract its
parameters. Respond with a strict JSON object of the shape
{"intent": "<tag>", "details": {...}} and nothing else.

Intent tags and their details keys:
- "show_cards": {"list_name": string}
- "move_card": {"card_name": string, "source_list": string, "target_list": string}
- "create_card": {"card_name": string, "list_name": string, "description": string (optional)}
- "list_boards": {}
- "generate_report": {"report_type": string}
- "unknown": {} (use for anything that is none of the above)

Example:
User message: Move 'Fix login bug' from To Do to Done
Response: {"intent": "move_card", "details": {"card_name": "Fix login bug", "source_list": "To Do", "target_list": "Done"}}"#;

/// Build the full prompt for one user message.
fn build_prompt(text: &str) -> String {
    format!("{INTENT_PROMPT}\n\nUser message: {text}\nResponse:")
}

// ---------------------------------------------------------------------------
// Payload decoding
// ---------------------------------------------------------------------------

/// Decode a model completion into `(intent, details)`.
///
/// Tolerates prose around the JSON by scanning from the first `{` to the
/// last `}`.  Returns the failure reason on any shape violation.
fn decode_payload(raw: &str) -> std::result::Result<(Intent, Map<String, Value>), String> {
    let start = raw.find('{').ok_or("no JSON object in completion")?;
    let end = raw.rfind('}').ok_or("no JSON object in completion")?;
    if end < start {
        return Err("no JSON object in completion".into());
    }

    let span = &raw[start..=end];
    let value: Value =
        serde_json::from_str(span).map_err(|e| format!("completion is not valid JSON: {e}"))?;

    let tag = value
        .get("intent")
        .and_then(|v| v.as_str())
        .ok_or("completion lacks an `intent` key")?;

    let details = value
        .get("details")
        .ok_or("completion lacks a `details` key")?
        .as_object()
        .ok_or("`details` is not an object")?
        .clone();

    Ok((Intent::from_tag(tag), details))
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Converts raw text into a typed [`Intent`] plus its parameter mapping.
pub struct IntentParser {
    llm: Arc<dyn TextCompleter>,
    max_attempts: u32,
}

impl IntentParser {
    /// Create a parser with the default attempt limit.
    pub fn new(llm: Arc<dyn TextCompleter>) -> Self {
        Self {
            llm,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the number of attempts made before declaring failure.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Parse one user message.
    ///
    /// Both transport failures and undecodable completions consume an
    /// attempt; the last failure reason is carried into the final error.
    pub async fn parse(&self, text: &str) -> Result<(Intent, Map<String, Value>)> {
        let prompt = build_prompt(text);
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            match self.llm.complete(&prompt).await {
                Ok(raw) => {
                    debug!(attempt, chars = raw.len(), "received completion");
                    match decode_payload(&raw) {
                        Ok((intent, details)) => {
                            info!(intent = intent.as_tag(), attempt, "intent parsed");
                            return Ok((intent, details));
                        }
                        Err(reason) => {
                            warn!(attempt, %reason, "undecodable completion");
                            last_reason = reason;
                        }
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "language model call failed");
                    last_reason = e.to_string();
                }
            }
        }

        Err(WorkflowError::parse(format!(
            "Unable to interpret the request ({last_reason})"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_json() {
        let raw = r#"{"intent": "show_cards", "details": {"list_name": "To Do"}}"#;
        let (intent, details) = decode_payload(raw).unwrap();
        assert_eq!(intent, Intent::ShowCards);
        assert_eq!(details.get("list_name").unwrap(), "To Do");
    }

    #[test]
    fn decode_tolerates_surrounding_prose() {
        let raw = "Sure! Here is the classification:\n```json\n{\"intent\": \"list_boards\", \"details\": {}}\n```\nLet me know if you need more.";
        let (intent, details) = decode_payload(raw).unwrap();
        assert_eq!(intent, Intent::ListBoards);
        assert!(details.is_empty());
    }

    #[test]
    fn decode_rejects_no_braces() {
        assert!(decode_payload("I cannot classify that.").is_err());
    }

    #[test]
    fn decode_rejects_reversed_braces() {
        assert!(decode_payload("} nothing here {").is_err());
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(decode_payload("{intent: show_cards}").is_err());
    }

    #[test]
    fn decode_rejects_missing_intent_key() {
        assert!(decode_payload(r#"{"details": {}}"#).is_err());
    }

    #[test]
    fn decode_rejects_missing_details_key() {
        assert!(decode_payload(r#"{"intent": "show_cards"}"#).is_err());
    }

    #[test]
    fn decode_rejects_non_object_details() {
        assert!(decode_payload(r#"{"intent": "show_cards", "details": "To Do"}"#).is_err());
    }

    #[test]
    fn unrecognized_tag_maps_to_unknown() {
        let raw = r#"{"intent": "delete_board", "details": {}}"#;
        let (intent, _) = decode_payload(raw).unwrap();
        assert_eq!(intent, Intent::Unknown);
    }

    #[test]
    fn tag_round_trip() {
        for intent in [
            Intent::ShowCards,
            Intent::MoveCard,
            Intent::CreateCard,
            Intent::ListBoards,
            Intent::GenerateReport,
            Intent::Unknown,
        ] {
            assert_eq!(Intent::from_tag(intent.as_tag()), intent);
        }
    }

    #[test]
    fn prompt_carries_shape_and_example() {
        let prompt = build_prompt("list my boards");
        assert!(prompt.contains(r#""intent""#));
        assert!(prompt.contains(r#""details""#));
        assert!(prompt.contains("move_card"));
        assert!(prompt.ends_with("User message: list my boards\nResponse:"));
    }
}
