//! Workflow engine — drive one message through the stage pipeline.
//!
//! The engine owns the fixed stage adjacency and runs an exhaustive match
//! over [`Stage`] until the terminal state.  Every stage converts its own
//! failures into `(error, NormalizeError)`; nothing escapes [`WorkflowEngine::run`],
//! which always returns a [`WorkflowReport`].  Delivery is invoked exactly
//! once per invocation; a delivery failure is reported beside the already
//! computed response, never retried.

use std::sync::Arc;

use tracing::{debug, info, warn};

use boardmate_adapters::MessageDelivery;

use crate::dispatcher::ActionDispatcher;
use crate::error::WorkflowError;
use crate::formatter::ResponseFormatter;
use crate::intent::IntentParser;
use crate::normalizer::ErrorNormalizer;
use crate::state::{Stage, WorkflowState};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What one invocation produced, returned to the caller regardless of how
/// the pipeline fared.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    /// The text that was (or should have been) posted to the channel.
    pub response: String,
    /// Whether delivery succeeded.
    pub delivered: bool,
    /// The delivery failure, when `delivered` is false.
    pub delivery_error: Option<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Sequences parse → dispatch → format → deliver for one inbound message,
/// with every stage able to short-circuit to the error normalizer.
pub struct WorkflowEngine {
    parser: IntentParser,
    dispatcher: ActionDispatcher,
    delivery: Arc<dyn MessageDelivery>,
}

impl WorkflowEngine {
    /// Assemble the engine from its stages and the delivery client.
    pub fn new(
        parser: IntentParser,
        dispatcher: ActionDispatcher,
        delivery: Arc<dyn MessageDelivery>,
    ) -> Self {
        Self {
            parser,
            dispatcher,
            delivery,
        }
    }

    /// Process one inbound message end to end.
    ///
    /// Never fails the caller: errors surface in the delivered text and in
    /// the returned report.
    pub async fn run(&self, input: &str, channel_id: &str) -> WorkflowReport {
        let mut state = WorkflowState::new(input, channel_id);
        let mut delivered = false;
        let mut delivery_error: Option<String> = None;

        loop {
            debug!(stage = ?state.next_stage, "running stage");
            match state.next_stage {
                Stage::ParseIntent => {
                    let parsed = self.parser.parse(&state.input).await;
                    match parsed {
                        Ok((intent, params)) => {
                            state.intent = Some(intent);
                            state.params = params;
                            state.next_stage = Stage::Dispatch;
                        }
                        Err(e) => state.fail(e),
                    }
                }

                Stage::Dispatch => match state.intent {
                    Some(intent) => {
                        let dispatched = self.dispatcher.dispatch(intent, &state.params).await;
                        match dispatched {
                            Ok(outcome) => {
                                state.outcome = Some(outcome);
                                state.next_stage = Stage::FormatResponse;
                            }
                            Err(e) => state.fail(e),
                        }
                    }
                    // Unreachable when the parser ran; guarded anyway so a
                    // broken transition cannot panic the engine.
                    None => state.fail(WorkflowError::validation(
                        "Sorry, I couldn't understand that request.",
                    )),
                },

                Stage::FormatResponse => match &state.outcome {
                    Some(outcome) => {
                        state.response = Some(ResponseFormatter::render(outcome));
                        state.next_stage = Stage::Deliver;
                    }
                    None => state.fail(WorkflowError::validation(
                        "Nothing to format for this request.",
                    )),
                },

                Stage::NormalizeError => {
                    if let Some(error) = &state.error {
                        info!(kind = error.kind(), message = %error, "normalizing error");
                    }
                    state.response = Some(ErrorNormalizer::normalize(state.error.as_ref()));
                    state.next_stage = Stage::Deliver;
                }

                Stage::Deliver => {
                    let text = state
                        .response
                        .clone()
                        .unwrap_or_else(|| ErrorNormalizer::normalize(None));
                    let sent = self.delivery.post_message(&state.channel_id, &text).await;
                    match sent {
                        Ok(()) => {
                            info!(channel = %state.channel_id, "response delivered");
                            delivered = true;
                        }
                        Err(e) => {
                            warn!(channel = %state.channel_id, error = %e, "delivery failed");
                            delivery_error = Some(
                                WorkflowError::delivery(format!(
                                    "Failed to deliver the response: {e}"
                                ))
                                .to_string(),
                            );
                        }
                    }
                    state.next_stage = Stage::Done;
                }

                Stage::Done => break,
            }
        }

        WorkflowReport {
            response: state.response.unwrap_or_default(),
            delivered,
            delivery_error,
        }
    }
}
