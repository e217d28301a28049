//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event, Reply, TurnFailure};
use crate::history::{Message, ToolCallRequest, ToolResult};
use crate::llm::LlmErrorKind;
use std::collections::HashSet;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Turn already finished")]
    TurnFinished,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Start a turn: the user message joins the working history and the
/// responder is asked for the first reply.
pub fn begin_turn(user_text: &str) -> TransitionResult {
    TransitionResult::new(ConvState::initial())
        .with_effect(Effect::append(Message::user(user_text)))
        .with_effect(Effect::RequestResponse)
}

/// Pure transition function
///
/// Given the same inputs this always produces the same outputs, with no
/// I/O side effects.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (state, _) if state.is_terminal() => Err(TransitionError::TurnFinished),

        // ============================================================
        // Responder replies
        // ============================================================

        (
            ConvState::AwaitingResponse {
                round_trip,
                call_ids,
            },
            Event::ResponderReplied { reply },
        ) => match reply {
            Reply::ToolCalls { text, calls } if !calls.is_empty() => {
                if let Some(id) = reused_call_id(call_ids, &calls) {
                    return Ok(TransitionResult::new(ConvState::Failed {
                        failure: TurnFailure::ResponderUnavailable {
                            kind: LlmErrorKind::Unknown,
                            message: format!("Responder reused tool call id {id}"),
                        },
                    }));
                }
                let mut call_ids = call_ids.clone();
                call_ids.extend(calls.iter().map(|c| c.id.clone()));
                Ok(TransitionResult::new(ConvState::DispatchingTools {
                    round_trip: *round_trip,
                    pending: calls.clone(),
                    call_ids,
                })
                .with_effect(Effect::append(Message::tool_calls(
                    non_empty(text),
                    calls.clone(),
                )))
                .with_effect(Effect::DispatchTools { calls }))
            }
            // A tool-call reply without calls is an answer
            Reply::ToolCalls { text, .. } => Ok(finish(text.unwrap_or_default())),
            Reply::Answer { text } => Ok(finish(text)),
        },

        (ConvState::AwaitingResponse { .. }, Event::ResponderFailed { error }) => {
            Ok(TransitionResult::new(ConvState::Failed {
                failure: TurnFailure::ResponderUnavailable {
                    kind: error.kind,
                    message: error.message,
                },
            }))
        }

        // ============================================================
        // Tool results
        // ============================================================

        (
            ConvState::DispatchingTools {
                round_trip,
                pending,
                call_ids,
            },
            Event::ToolsCompleted { results },
        ) => {
            check_results_match(pending, &results)?;

            if *round_trip >= context.max_round_trips {
                return Ok(TransitionResult::new(ConvState::Failed {
                    failure: TurnFailure::ToolLoopExceeded {
                        limit: context.max_round_trips,
                    },
                }));
            }

            Ok(TransitionResult::new(ConvState::AwaitingResponse {
                round_trip: round_trip + 1,
                call_ids: call_ids.clone(),
            })
            .with_effects(
                results
                    .into_iter()
                    .map(|r| Effect::append(Message::tool_result(r))),
            )
            .with_effect(Effect::RequestResponse))
        }

        // ============================================================
        // Everything else is a runtime bug
        // ============================================================

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} does not accept {}",
            state_name(state),
            event_name(&event)
        ))),
    }
}

fn finish(text: String) -> TransitionResult {
    if text.trim().is_empty() {
        return TransitionResult::new(ConvState::Failed {
            failure: TurnFailure::ResponderUnavailable {
                kind: LlmErrorKind::Unknown,
                message: "Responder returned an empty answer".to_string(),
            },
        });
    }
    TransitionResult::new(ConvState::Done)
        .with_effect(Effect::append(Message::assistant(text)))
        .with_effect(Effect::Commit)
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// First id that repeats an earlier call this turn or another call in
/// the same reply
fn reused_call_id<'a>(used: &[String], calls: &'a [ToolCallRequest]) -> Option<&'a str> {
    let mut seen: HashSet<&str> = used.iter().map(String::as_str).collect();
    calls
        .iter()
        .map(|c| c.id.as_str())
        .find(|id| !seen.insert(id))
}

fn check_results_match(
    pending: &[ToolCallRequest],
    results: &[ToolResult],
) -> Result<(), TransitionError> {
    if pending.len() != results.len() {
        return Err(TransitionError::InvalidTransition(format!(
            "expected {} tool results, got {}",
            pending.len(),
            results.len()
        )));
    }
    for (call, result) in pending.iter().zip(results) {
        if call.id != result.call_id {
            return Err(TransitionError::InvalidTransition(format!(
                "tool result {} does not answer pending call {}",
                result.call_id, call.id
            )));
        }
    }
    Ok(())
}

fn state_name(state: &ConvState) -> &'static str {
    match state {
        ConvState::AwaitingResponse { .. } => "awaiting_response",
        ConvState::DispatchingTools { .. } => "dispatching_tools",
        ConvState::Done => "done",
        ConvState::Failed { .. } => "failed",
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::ResponderReplied { .. } => "responder_replied",
        Event::ResponderFailed { .. } => "responder_failed",
        Event::ToolsCompleted { .. } => "tools_completed",
    }
}
