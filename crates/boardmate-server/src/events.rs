//! Slack events endpoint.
//!
//! Handles the three envelope kinds Slack sends:
//!
//! - `url_verification` — echo the challenge back.
//! - `event_callback` with an `app_mention` — the mention prefix is
//!   stripped and the rest runs through the workflow.
//! - `event_callback` with a plain `message` — only processed when the text
//!   starts with the `trello:` keyword.
//!
//! Slack requires a fast acknowledgement, so the workflow runs on a spawned
//! task and the handler returns immediately.  Bot-authored events are
//! ignored to avoid reply loops.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::signature;

/// Keyword prefix that opts a plain channel message into processing.
const COMMAND_PREFIX: &str = "trello:";

/// `POST /slack/events`
pub async fn slack_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header(&headers, "x-slack-request-timestamp");
    let provided = header(&headers, "x-slack-signature");
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    if !signature::verify(&state.signing_secret, timestamp, &body, provided, now) {
        warn!("rejected request with invalid signature");
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid signature"})))
            .into_response();
    }

    let envelope: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "rejected undecodable event body");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid body"})))
                .into_response();
        }
    };

    // URL verification handshake.
    if let Some(challenge) = envelope.get("challenge").and_then(|c| c.as_str()) {
        debug!("answering url_verification challenge");
        return Json(json!({"challenge": challenge})).into_response();
    }

    if let Some((text, channel_id)) = extract_command(&envelope) {
        info!(channel = %channel_id, "dispatching inbound command");
        let engine = state.engine.clone();
        tokio::spawn(async move {
            let report = engine.run(&text, &channel_id).await;
            if let Some(error) = report.delivery_error {
                warn!(channel = %channel_id, %error, "response could not be delivered");
            }
        });
    }

    Json(json!({"status": "ok"})).into_response()
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Pull the command text and channel out of an event envelope, if this
/// event should be processed at all.
fn extract_command(envelope: &Value) -> Option<(String, String)> {
    let event = envelope.get("event")?;

    // Ignore the bot's own messages.
    if event.get("bot_id").is_some() {
        return None;
    }

    let kind = event.get("type").and_then(|t| t.as_str())?;
    let text = event.get("text").and_then(|t| t.as_str())?;
    let channel = event.get("channel").and_then(|c| c.as_str())?;

    match kind {
        "app_mention" => {
            // Drop the leading `<@U...>` mention token.
            let command = text
                .split_once('>')
                .map(|(_, rest)| rest)
                .unwrap_or(text)
                .trim();
            (!command.is_empty()).then(|| (command.to_owned(), channel.to_owned()))
        }
        "message" => {
            let lowered = text.trim_start().to_lowercase();
            if !lowered.starts_with(COMMAND_PREFIX) {
                return None;
            }
            let command = text.trim_start()[COMMAND_PREFIX.len()..].trim();
            (!command.is_empty()).then(|| (command.to_owned(), channel.to_owned()))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_mention_strips_the_mention_token() {
        let envelope = json!({
            "event": {
                "type": "app_mention",
                "text": "<@U0BOT> show cards in To Do",
                "channel": "C123"
            }
        });
        let (text, channel) = extract_command(&envelope).unwrap();
        assert_eq!(text, "show cards in To Do");
        assert_eq!(channel, "C123");
    }

    #[test]
    fn bot_events_are_ignored() {
        let envelope = json!({
            "event": {
                "type": "app_mention",
                "bot_id": "B99",
                "text": "<@U0BOT> loop",
                "channel": "C123"
            }
        });
        assert!(extract_command(&envelope).is_none());
    }

    #[test]
    fn plain_message_requires_the_keyword_prefix() {
        let with_prefix = json!({
            "event": {
                "type": "message",
                "text": "trello: list my boards",
                "channel": "C123"
            }
        });
        let (text, _) = extract_command(&with_prefix).unwrap();
        assert_eq!(text, "list my boards");

        let without_prefix = json!({
            "event": {
                "type": "message",
                "text": "good morning everyone",
                "channel": "C123"
            }
        });
        assert!(extract_command(&without_prefix).is_none());
    }

    #[test]
    fn empty_commands_are_dropped() {
        let envelope = json!({
            "event": {
                "type": "app_mention",
                "text": "<@U0BOT>   ",
                "channel": "C123"
            }
        });
        assert!(extract_command(&envelope).is_none());
    }

    #[test]
    fn non_message_events_are_ignored() {
        let envelope = json!({
            "event": {
                "type": "reaction_added",
                "text": "trello: hi",
                "channel": "C123"
            }
        });
        assert!(extract_command(&envelope).is_none());
    }
}
