//! Collaborator traits and shared record types.
//!
//! The workflow core talks to the outside world exclusively through
//! [`TaskBoard`] and [`MessageDelivery`].  Directories are name→id maps,
//! re-fetched on every invocation; duplicate names collapse with the last
//! entry winning.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A task card as returned by the board service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    /// Service-assigned card identifier.
    pub id: String,
    /// Card title.
    pub name: String,
    /// Free-text description (may be empty).
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Whether the card has been archived.
    #[serde(default)]
    pub closed: bool,
    /// ISO-8601 timestamp of the card's last activity.
    #[serde(rename = "dateLastActivity", default)]
    pub date_last_activity: String,
    /// Browser URL for the card.
    #[serde(default)]
    pub url: String,
}

/// Fields to change on an existing card.  `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    /// Move the card to this column.
    pub column_id: Option<String>,
    /// Rename the card.
    pub name: Option<String>,
    /// Replace the card description.
    pub description: Option<String>,
}

impl CardUpdate {
    /// An update that only moves the card to another column.
    pub fn move_to(column_id: impl Into<String>) -> Self {
        Self {
            column_id: Some(column_id.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Name→id directory of boards, columns, or cards.
pub type NameIndex = BTreeMap<String, String>;

/// Synchronous-in-sequence operations against the external task board.
#[async_trait]
pub trait TaskBoard: Send + Sync {
    /// List all boards visible to the configured credentials.
    async fn list_boards(&self) -> Result<NameIndex>;

    /// List the columns ("lists") of one board.
    async fn list_columns(&self, board_id: &str) -> Result<NameIndex>;

    /// List the cards of one column.
    async fn list_cards(&self, column_id: &str) -> Result<NameIndex>;

    /// Create a card at the top of a column.
    async fn create_card(
        &self,
        column_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<CardRecord>;

    /// Apply a partial update to a card.
    async fn update_card(&self, card_id: &str, update: CardUpdate) -> Result<CardRecord>;

    /// Fetch the full detail of one card.
    async fn get_card(&self, card_id: &str) -> Result<CardRecord>;
}

/// Post one text message to a channel.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// Deliver `text` to `channel_id`.  Non-success responses are errors.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_record_deserializes_trello_shape() {
        let raw = serde_json::json!({
            "id": "card123",
            "name": "Fix login bug",
            "desc": "repro steps attached",
            "closed": false,
            "dateLastActivity": "2025-06-01T09:30:00.000Z",
            "url": "https://trello.com/c/card123",
            "idList": "list456"
        });
        let card: CardRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(card.name, "Fix login bug");
        assert_eq!(card.description, "repro steps attached");
        assert!(!card.closed);
        assert_eq!(card.date_last_activity, "2025-06-01T09:30:00.000Z");
    }

    #[test]
    fn card_record_tolerates_missing_optionals() {
        let raw = serde_json::json!({"id": "c1", "name": "bare"});
        let card: CardRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(card.description, "");
        assert_eq!(card.url, "");
        assert!(!card.closed);
    }

    #[test]
    fn card_update_move_to_sets_only_column() {
        let update = CardUpdate::move_to("list789");
        assert_eq!(update.column_id.as_deref(), Some("list789"));
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }
}
