//! Action dispatch — execute a typed intent against the task board.
//!
//! The dispatcher validates parameters, resolves name-keyed directories
//! (boards, lists, cards) fetched fresh on every invocation, performs the
//! intent's remote calls in sequence, and produces an [`ActionOutcome`].
//! Lookups are case-insensitive and recover the directory's canonical name.
//! Remote calls are unretried; any failure is terminal for the invocation,
//! except per-card detail fetches during report generation, which are
//! counted and surfaced as skipped.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use boardmate_adapters::{CardRecord, CardUpdate, NameIndex, TaskBoard};

use crate::error::{Result, WorkflowError};
use crate::intent::Intent;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The structured result of a successfully dispatched action, prior to text
/// rendering.  Each variant carries only what the formatter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The cards of one list (possibly none).
    CardsListed {
        list_name: String,
        card_names: Vec<String>,
    },
    /// A card was moved between lists.
    CardMoved {
        card_name: String,
        from_list: String,
        to_list: String,
    },
    /// A card was created.
    CardCreated {
        card_name: String,
        list_name: String,
    },
    /// All visible boards.
    BoardsListed { board_names: Vec<String> },
    /// A rendered activity report.
    ReportGenerated {
        report_type: String,
        text: String,
        /// Cards whose detail fetch failed and were left out of the report.
        skipped_cards: usize,
    },
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

/// Fetch a required non-empty string parameter.
fn require_str(params: &Map<String, Value>, key: &str) -> Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| WorkflowError::validation(format!("Missing required parameter '{key}'")))
}

/// Fetch an optional string parameter.
fn optional_str(params: &Map<String, Value>, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Case-insensitive lookup in a name→id directory, recovering the canonical
/// name.  With duplicate casings the last entry wins.
fn resolve(directory: &NameIndex, name: &str) -> Option<(String, String)> {
    let wanted = name.to_lowercase();
    directory
        .iter()
        .filter(|(key, _)| key.to_lowercase() == wanted)
        .map(|(key, id)| (key.clone(), id.clone()))
        .last()
}

// ---------------------------------------------------------------------------
// Report rendering
// ---------------------------------------------------------------------------

/// Parse the calendar date out of an ISO-8601 timestamp (a trailing `Z` is
/// the UTC offset).  Returns `None` for unparseable values.
fn activity_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Render the daily stand-up report for the given calendar date.
///
/// The timestamp's own date component (UTC for `Z`-suffixed values) is
/// compared against `today`; cards near midnight can land on either side of
/// the boundary depending on the server's local offset.
fn render_daily_report(today: NaiveDate, cards: &[CardRecord], skipped_cards: usize) -> String {
    let mut summary = String::from("# Daily Stand-Up Summary\n\n");
    summary.push_str(&format!("Date: {}\n\n", today.format("%d/%m/%Y")));

    let today_cards: Vec<&CardRecord> = cards
        .iter()
        .filter(|card| activity_date(&card.date_last_activity) == Some(today))
        .collect();

    if today_cards.is_empty() {
        summary.push_str("No cards were updated today.\n");
    } else {
        summary.push_str(&format!("## Cards Updated Today ({})\n\n", today_cards.len()));
        for card in &today_cards {
            let status = if card.closed { "Closed" } else { "Open" };
            let description = if card.description.is_empty() {
                "No description"
            } else {
                card.description.as_str()
            };
            summary.push_str(&format!("### {}\n", card.name));
            summary.push_str(&format!("- **Status:** {status}\n"));
            summary.push_str(&format!("- **Description:** {description}\n"));
            summary.push_str(&format!("- **Last Updated:** {}\n", card.date_last_activity));
            summary.push_str(&format!("- **URL:** {}\n\n", card.url));
        }
    }

    if skipped_cards > 0 {
        summary.push_str(&format!(
            "_{skipped_cards} card(s) could not be fetched and were skipped._\n"
        ));
    }

    summary
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Maps a typed [`Intent`] to task-board calls and an [`ActionOutcome`].
pub struct ActionDispatcher {
    board: Arc<dyn TaskBoard>,
    default_board_id: String,
}

impl ActionDispatcher {
    /// Create a dispatcher bound to a task board and a default board id.
    pub fn new(board: Arc<dyn TaskBoard>, default_board_id: impl Into<String>) -> Self {
        Self {
            board,
            default_board_id: default_board_id.into(),
        }
    }

    /// Execute one intent.  Parameter validation happens here, not in the
    /// parser.
    pub async fn dispatch(
        &self,
        intent: Intent,
        params: &Map<String, Value>,
    ) -> Result<ActionOutcome> {
        debug!(intent = intent.as_tag(), "dispatching intent");
        match intent {
            Intent::ShowCards => self.show_cards(params).await,
            Intent::MoveCard => self.move_card(params).await,
            Intent::CreateCard => self.create_card(params).await,
            Intent::ListBoards => self.list_boards().await,
            Intent::GenerateReport => self.generate_report(params).await,
            Intent::Unknown => Err(WorkflowError::validation(
                "Sorry, I couldn't understand that request.",
            )),
        }
    }

    /// Resolve the working board and fetch its column directory.
    async fn columns(&self, params: &Map<String, Value>) -> Result<NameIndex> {
        let board_id =
            optional_str(params, "board_id").unwrap_or_else(|| self.default_board_id.clone());
        self.board.list_columns(&board_id).await.map_err(|e| {
            warn!(board_id = %board_id, error = %e, "column directory fetch failed");
            WorkflowError::remote("Unable to retrieve lists from the board. Please try again later.")
        })
    }

    async fn show_cards(&self, params: &Map<String, Value>) -> Result<ActionOutcome> {
        let list_name = require_str(params, "list_name")?;
        let columns = self.columns(params).await?;

        let (actual_name, column_id) = resolve(&columns, &list_name).ok_or_else(|| {
            WorkflowError::lookup(format!("List '{list_name}' not found on the board"))
        })?;

        let cards = self.board.list_cards(&column_id).await.map_err(|e| {
            warn!(column_id = %column_id, error = %e, "card directory fetch failed");
            WorkflowError::remote(format!(
                "Unable to retrieve cards from '{actual_name}'. Please try again later."
            ))
        })?;

        info!(list = %actual_name, count = cards.len(), "cards listed");
        Ok(ActionOutcome::CardsListed {
            list_name: actual_name,
            card_names: cards.keys().cloned().collect(),
        })
    }

    async fn move_card(&self, params: &Map<String, Value>) -> Result<ActionOutcome> {
        let card_name = require_str(params, "card_name")?;
        let source_list = require_str(params, "source_list")?;
        let target_list = require_str(params, "target_list")?;
        let columns = self.columns(params).await?;

        let (source_name, source_id) = resolve(&columns, &source_list).ok_or_else(|| {
            WorkflowError::lookup(format!("Source list '{source_list}' not found on the board"))
        })?;
        let (target_name, target_id) = resolve(&columns, &target_list).ok_or_else(|| {
            WorkflowError::lookup(format!("Target list '{target_list}' not found on the board"))
        })?;

        let cards = self.board.list_cards(&source_id).await.map_err(|e| {
            warn!(column_id = %source_id, error = %e, "card directory fetch failed");
            WorkflowError::remote(format!(
                "Unable to retrieve cards from '{source_name}'. Please try again later."
            ))
        })?;

        let (card_actual, card_id) = resolve(&cards, &card_name).ok_or_else(|| {
            WorkflowError::lookup(format!("Card '{card_name}' not found in '{source_name}'"))
        })?;

        self.board
            .update_card(&card_id, CardUpdate::move_to(&target_id))
            .await
            .map_err(|e| {
                warn!(card_id = %card_id, error = %e, "card move failed");
                WorkflowError::remote(format!(
                    "Failed to move card '{card_actual}'. Please try again later."
                ))
            })?;

        info!(card = %card_actual, from = %source_name, to = %target_name, "card moved");
        Ok(ActionOutcome::CardMoved {
            card_name: card_actual,
            from_list: source_name,
            to_list: target_name,
        })
    }

    async fn create_card(&self, params: &Map<String, Value>) -> Result<ActionOutcome> {
        let card_name = require_str(params, "card_name")?;
        let list_name = require_str(params, "list_name")?;
        let description = optional_str(params, "description");
        let columns = self.columns(params).await?;

        let (actual_name, column_id) = resolve(&columns, &list_name).ok_or_else(|| {
            WorkflowError::lookup(format!("List '{list_name}' not found on the board"))
        })?;

        let created = self
            .board
            .create_card(&column_id, &card_name, description.as_deref())
            .await
            .map_err(|e| {
                warn!(column_id = %column_id, error = %e, "card creation failed");
                WorkflowError::remote(format!(
                    "Failed to create card '{card_name}'. Please try again later."
                ))
            })?;

        info!(card = %created.name, list = %actual_name, "card created");
        Ok(ActionOutcome::CardCreated {
            card_name: created.name,
            list_name: actual_name,
        })
    }

    async fn list_boards(&self) -> Result<ActionOutcome> {
        let boards = self.board.list_boards().await.map_err(|e| {
            warn!(error = %e, "board directory fetch failed");
            WorkflowError::remote("Unable to retrieve your boards. Please try again later.")
        })?;

        info!(count = boards.len(), "boards listed");
        Ok(ActionOutcome::BoardsListed {
            board_names: boards.keys().cloned().collect(),
        })
    }

    async fn generate_report(&self, params: &Map<String, Value>) -> Result<ActionOutcome> {
        let report_type = require_str(params, "report_type")?;
        if !report_type.eq_ignore_ascii_case("daily activity") {
            return Err(WorkflowError::validation(format!(
                "Unsupported report type '{report_type}'"
            )));
        }

        let columns = self.columns(params).await?;

        let mut details: Vec<CardRecord> = Vec::new();
        let mut skipped_cards = 0usize;
        for (column_name, column_id) in &columns {
            let cards = self.board.list_cards(column_id).await.map_err(|e| {
                warn!(column_id = %column_id, error = %e, "card directory fetch failed");
                WorkflowError::remote(format!(
                    "Unable to retrieve cards from '{column_name}'. Please try again later."
                ))
            })?;

            for card_id in cards.values() {
                match self.board.get_card(card_id).await {
                    Ok(detail) => details.push(detail),
                    Err(e) => {
                        warn!(card_id = %card_id, error = %e, "card detail fetch failed, skipping");
                        skipped_cards += 1;
                    }
                }
            }
        }

        let today = Local::now().date_naive();
        let text = render_daily_report(today, &details, skipped_cards);

        info!(
            cards = details.len(),
            skipped = skipped_cards,
            "daily report generated"
        );
        Ok(ActionOutcome::ReportGenerated {
            report_type,
            text,
            skipped_cards,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), json!(v)))
            .collect()
    }

    fn card(name: &str, last_activity: &str) -> CardRecord {
        CardRecord {
            id: "c1".into(),
            name: name.into(),
            description: String::new(),
            closed: false,
            date_last_activity: last_activity.into(),
            url: "https://trello.com/c/c1".into(),
        }
    }

    #[test]
    fn require_str_rejects_missing_and_empty() {
        let p = params(&[("list_name", "  ")]);
        assert!(require_str(&p, "list_name").is_err());
        assert!(require_str(&p, "card_name").is_err());
        let p = params(&[("list_name", "To Do")]);
        assert_eq!(require_str(&p, "list_name").unwrap(), "To Do");
    }

    #[test]
    fn resolve_is_case_insensitive_and_recovers_canonical_name() {
        let mut directory = NameIndex::new();
        directory.insert("In Progress".into(), "l2".into());
        let (name, id) = resolve(&directory, "in progress").unwrap();
        assert_eq!(name, "In Progress");
        assert_eq!(id, "l2");
        assert!(resolve(&directory, "Done").is_none());
    }

    #[test]
    fn activity_date_parses_utc_suffix() {
        assert_eq!(
            activity_date("2025-06-01T09:30:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert!(activity_date("not a date").is_none());
    }

    // A 23:30Z timestamp still counts as June 1st even when the local
    // invocation date may already be June 2nd; the boundary behavior is
    // pinned here on purpose.
    #[test]
    fn activity_date_uses_the_timestamp_date_component() {
        assert_eq!(
            activity_date("2025-06-01T23:30:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn empty_report_body_is_exact() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let text = render_daily_report(today, &[], 0);
        assert_eq!(
            text,
            "# Daily Stand-Up Summary\n\nDate: 01/06/2025\n\nNo cards were updated today.\n"
        );
    }

    #[test]
    fn stale_cards_do_not_appear_in_the_report() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let cards = vec![card("Old work", "2025-05-20T10:00:00.000Z")];
        let text = render_daily_report(today, &cards, 0);
        assert!(text.contains("No cards were updated today.\n"));
    }

    #[test]
    fn todays_cards_render_as_blocks() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut fresh = card("Ship release", "2025-06-01T08:15:00.000Z");
        fresh.description = "cut the tag".into();
        let text = render_daily_report(today, &[fresh], 0);
        assert!(text.contains("## Cards Updated Today (1)\n"));
        assert!(text.contains("### Ship release\n"));
        assert!(text.contains("- **Status:** Open\n"));
        assert!(text.contains("- **Description:** cut the tag\n"));
    }

    #[test]
    fn skipped_cards_are_surfaced() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let text = render_daily_report(today, &[], 2);
        assert!(text.contains("_2 card(s) could not be fetched and were skipped._\n"));
    }

    #[test]
    fn empty_description_renders_placeholder() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let text = render_daily_report(today, &[card("Bare", "2025-06-01T08:00:00Z")], 0);
        assert!(text.contains("- **Description:** No description\n"));
    }
}
