//! Trello REST API client.
//!
//! Implements the [`TaskBoard`] trait against the Trello v1 API.
//! Authentication uses the key/token query-parameter scheme; directories
//! (boards, lists, cards) are returned as name→id maps.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AdapterError, Result};
use crate::traits::{CardRecord, CardUpdate, NameIndex, TaskBoard};

/// Default Trello API base URL.
const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for the Trello API.
#[derive(Debug, Clone)]
pub struct TrelloConfig {
    /// Trello developer API key.
    pub api_key: String,
    /// Trello member token.
    pub token: String,
    /// Base URL for the API (default: `https://api.trello.com/1`).
    pub base_url: String,
}

impl TrelloConfig {
    /// Create a configuration with the default API URL.
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Read the configuration from `TRELLO_API_KEY` / `TRELLO_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("TRELLO_API_KEY").map_err(|_| AdapterError::MissingCredential {
                provider: "trello".into(),
                env_var: "TRELLO_API_KEY".into(),
            })?;
        let token = std::env::var("TRELLO_TOKEN").map_err(|_| AdapterError::MissingCredential {
            provider: "trello".into(),
            env_var: "TRELLO_TOKEN".into(),
        })?;
        Ok(Self::new(api_key, token))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Trello task-board client.
pub struct TrelloClient {
    config: TrelloConfig,
    http: reqwest::Client,
}

impl TrelloClient {
    /// Create a new client from a configuration.
    pub fn new(config: TrelloConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("boardmate/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Build a full API URL from a path segment.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Credential query parameters appended to every request.
    fn auth(&self) -> [(&'static str, &str); 2] {
        [
            ("key", self.config.api_key.as_str()),
            ("token", self.config.token.as_str()),
        ]
    }

    /// Send a request and parse the JSON response.
    ///
    /// Non-2xx responses become [`AdapterError::UnexpectedStatus`] carrying
    /// the body text (Trello reports errors as plain text).
    async fn send(&self, request: reqwest::RequestBuilder, operation: &str) -> Result<Value> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AdapterError::RequestFailed {
                operation: operation.into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AdapterError::RequestFailed {
                operation: operation.into(),
                reason: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "Trello API error");
            return Err(AdapterError::UnexpectedStatus {
                operation: operation.into(),
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AdapterError::InvalidResponse {
            operation: operation.into(),
            reason: format!("body is not valid JSON: {e}"),
        })
    }

    /// Collapse an array of `{name, id}` objects into a name→id map.
    ///
    /// Duplicate names collapse, last entry wins.
    fn name_index(items: &Value, operation: &str) -> Result<NameIndex> {
        let array = items
            .as_array()
            .ok_or_else(|| AdapterError::InvalidResponse {
                operation: operation.into(),
                reason: "expected a JSON array".into(),
            })?;

        let mut index = NameIndex::new();
        for item in array {
            let name = item.get("name").and_then(|v| v.as_str());
            let id = item.get("id").and_then(|v| v.as_str());
            if let (Some(name), Some(id)) = (name, id) {
                index.insert(name.to_owned(), id.to_owned());
            }
        }
        Ok(index)
    }

    /// Decode a card object from a response body.
    fn card_record(value: Value, operation: &str) -> Result<CardRecord> {
        serde_json::from_value(value).map_err(|e| AdapterError::InvalidResponse {
            operation: operation.into(),
            reason: format!("body is not a card record: {e}"),
        })
    }
}

#[async_trait]
impl TaskBoard for TrelloClient {
    async fn list_boards(&self) -> Result<NameIndex> {
        let url = self.api_url("/members/me/boards");
        debug!(url = %url, "listing boards");
        let body = self
            .send(self.http.get(&url).query(&self.auth()), "list_boards")
            .await?;
        Self::name_index(&body, "list_boards")
    }

    async fn list_columns(&self, board_id: &str) -> Result<NameIndex> {
        let url = self.api_url(&format!("/boards/{board_id}/lists"));
        debug!(url = %url, "listing columns");
        let body = self
            .send(self.http.get(&url).query(&self.auth()), "list_columns")
            .await?;
        Self::name_index(&body, "list_columns")
    }

    async fn list_cards(&self, column_id: &str) -> Result<NameIndex> {
        let url = self.api_url(&format!("/lists/{column_id}/cards"));
        debug!(url = %url, "listing cards");
        let body = self
            .send(self.http.get(&url).query(&self.auth()), "list_cards")
            .await?;
        Self::name_index(&body, "list_cards")
    }

    async fn create_card(
        &self,
        column_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<CardRecord> {
        let url = self.api_url("/cards");
        debug!(url = %url, column_id, name, "creating card");

        let mut request = self.http.post(&url).query(&self.auth()).query(&[
            ("idList", column_id),
            ("name", name),
            ("pos", "top"),
        ]);
        if let Some(desc) = description {
            request = request.query(&[("desc", desc)]);
        }

        let body = self.send(request, "create_card").await?;
        Self::card_record(body, "create_card")
    }

    async fn update_card(&self, card_id: &str, update: CardUpdate) -> Result<CardRecord> {
        let url = self.api_url(&format!("/cards/{card_id}"));
        debug!(url = %url, card_id, "updating card");

        let mut request = self.http.put(&url).query(&self.auth());
        if let Some(column_id) = &update.column_id {
            request = request.query(&[("idList", column_id.as_str())]);
        }
        if let Some(name) = &update.name {
            request = request.query(&[("name", name.as_str())]);
        }
        if let Some(desc) = &update.description {
            request = request.query(&[("desc", desc.as_str())]);
        }

        let body = self.send(request, "update_card").await?;
        Self::card_record(body, "update_card")
    }

    async fn get_card(&self, card_id: &str) -> Result<CardRecord> {
        let url = self.api_url(&format!("/cards/{card_id}"));
        debug!(url = %url, "fetching card detail");
        let body = self
            .send(self.http.get(&url).query(&self.auth()), "get_card")
            .await?;
        Self::card_record(body, "get_card")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_index_maps_names_to_ids() {
        let body = serde_json::json!([
            {"name": "To Do", "id": "l1"},
            {"name": "In Progress", "id": "l2"},
            {"name": "Done", "id": "l3"}
        ]);
        let index = TrelloClient::name_index(&body, "list_columns").unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get("In Progress").unwrap(), "l2");
    }

    #[test]
    fn name_index_collapses_duplicates_last_wins() {
        let body = serde_json::json!([
            {"name": "Done", "id": "old"},
            {"name": "Done", "id": "new"}
        ]);
        let index = TrelloClient::name_index(&body, "list_columns").unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Done").unwrap(), "new");
    }

    #[test]
    fn name_index_skips_malformed_entries() {
        let body = serde_json::json!([
            {"name": "ok", "id": "l1"},
            {"id": "no-name"},
            {"name": "no-id"}
        ]);
        let index = TrelloClient::name_index(&body, "list_cards").unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn name_index_rejects_non_array() {
        let body = serde_json::json!({"message": "invalid token"});
        assert!(TrelloClient::name_index(&body, "list_boards").is_err());
    }

    #[test]
    fn api_url_handles_trailing_slash() {
        let mut config = TrelloConfig::new("k", "t");
        config.base_url = "https://api.trello.com/1/".into();
        let client = TrelloClient::new(config);
        assert_eq!(
            client.api_url("/members/me/boards"),
            "https://api.trello.com/1/members/me/boards"
        );
    }
}
