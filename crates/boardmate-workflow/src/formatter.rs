//! Response formatting — outcome to display text.
//!
//! A pure function over [`ActionOutcome`]; no I/O, no state.  The match is
//! exhaustive over the closed outcome set, so new variants cannot ship
//! without a template.

use crate::dispatcher::ActionOutcome;

/// Renders an [`ActionOutcome`] into the text posted to the channel.
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Render one outcome.  Calling twice with the same input yields
    /// identical text.
    pub fn render(outcome: &ActionOutcome) -> String {
        match outcome {
            ActionOutcome::CardsListed {
                list_name,
                card_names,
            } => {
                if card_names.is_empty() {
                    format!("No cards found in list '{list_name}'.")
                } else {
                    let mut text = format!("📋 Cards in '{list_name}':\n\n");
                    for name in card_names {
                        text.push_str(&format!("• {name}\n"));
                    }
                    text
                }
            }

            ActionOutcome::CardMoved {
                card_name,
                from_list,
                to_list,
            } => format!(
                "✅ Successfully moved card '{card_name}' from '{from_list}' to '{to_list}'."
            ),

            ActionOutcome::CardCreated {
                card_name,
                list_name,
            } => format!("✅ Created new card '{card_name}' in list '{list_name}'."),

            ActionOutcome::BoardsListed { board_names } => {
                if board_names.is_empty() {
                    "📋 No boards found.".to_owned()
                } else {
                    let mut text = String::from("📋 Your Boards:\n\n");
                    for name in board_names {
                        text.push_str(&format!("• {name}\n"));
                    }
                    text
                }
            }

            ActionOutcome::ReportGenerated { text, .. } => text.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_card_list_message_is_exact() {
        let outcome = ActionOutcome::CardsListed {
            list_name: "In Progress".into(),
            card_names: vec![],
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            "No cards found in list 'In Progress'."
        );
    }

    #[test]
    fn card_list_renders_bullets() {
        let outcome = ActionOutcome::CardsListed {
            list_name: "To Do".into(),
            card_names: vec!["Fix bug".into(), "Write docs".into()],
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            "📋 Cards in 'To Do':\n\n• Fix bug\n• Write docs\n"
        );
    }

    #[test]
    fn card_created_message_is_exact() {
        let outcome = ActionOutcome::CardCreated {
            card_name: "Ship it".into(),
            list_name: "To Do".into(),
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            "✅ Created new card 'Ship it' in list 'To Do'."
        );
    }

    #[test]
    fn card_moved_message_is_exact() {
        let outcome = ActionOutcome::CardMoved {
            card_name: "Fix bug".into(),
            from_list: "To Do".into(),
            to_list: "Done".into(),
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            "✅ Successfully moved card 'Fix bug' from 'To Do' to 'Done'."
        );
    }

    #[test]
    fn boards_render_under_fixed_header() {
        let outcome = ActionOutcome::BoardsListed {
            board_names: vec!["Alpha".into(), "Beta".into()],
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            "📋 Your Boards:\n\n• Alpha\n• Beta\n"
        );
    }

    #[test]
    fn empty_boards_render_fallback() {
        let outcome = ActionOutcome::BoardsListed {
            board_names: vec![],
        };
        assert_eq!(ResponseFormatter::render(&outcome), "📋 No boards found.");
    }

    #[test]
    fn report_text_passes_through_verbatim() {
        let outcome = ActionOutcome::ReportGenerated {
            report_type: "daily activity".into(),
            text: "# Daily Stand-Up Summary\n".into(),
            skipped_cards: 0,
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            "# Daily Stand-Up Summary\n"
        );
    }

    #[test]
    fn rendering_is_pure() {
        let outcome = ActionOutcome::CardsListed {
            list_name: "QA".into(),
            card_names: vec!["Smoke test".into()],
        };
        assert_eq!(
            ResponseFormatter::render(&outcome),
            ResponseFormatter::render(&outcome)
        );
    }
}
