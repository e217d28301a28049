//! Turn executor
//!
//! Feeds events into the pure transition function and executes the effects
//! it returns. The working history is a local copy; the session history is
//! only replaced when the state machine commits.

use super::traits::{ResponderModel, ToolInvoker};
use crate::history::{HistoryBuffer, Message, ToolCallRequest, ToolResult};
use crate::llm::{LlmError, ToolDefinition};
use crate::state_machine::{
    begin_turn, transition, ConvContext, ConvState, Effect, Event, TurnFailure,
    DEFAULT_MAX_ROUND_TRIPS,
};
use crate::tools::ToolContext;
use futures::future::join_all;
use std::collections::VecDeque;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Limits applied to every turn
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_round_trips: u32,
    pub responder_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
            responder_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

/// A successful turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Prior history plus every message produced during the turn
    pub history: Vec<Message>,
    /// The assistant's answer
    pub final_message: Message,
}

/// Runs turns against a responder and a tool invoker
pub struct ConversationEngine<R, T>
where
    R: ResponderModel,
    T: ToolInvoker,
{
    responder: R,
    tools: T,
    config: EngineConfig,
}

impl<R, T> ConversationEngine<R, T>
where
    R: ResponderModel,
    T: ToolInvoker,
{
    pub fn new(responder: R, tools: T, config: EngineConfig) -> Self {
        Self {
            responder,
            tools,
            config,
        }
    }

    /// Run one turn on `history`. The input is never modified; on success
    /// the extended history comes back in the outcome.
    pub async fn turn(
        &self,
        session_id: &str,
        history: &[Message],
        user_text: &str,
    ) -> Result<TurnOutcome, TurnFailure> {
        let context = ConvContext::new(self.config.max_round_trips);
        let tool_defs = self.tools.definitions();
        let mut working = history.to_vec();
        let mut committed = false;

        let start = begin_turn(user_text);
        let mut state = start.new_state;
        let mut effects: VecDeque<Effect> = start.effects.into();

        while let Some(effect) = effects.pop_front() {
            let event = match effect {
                Effect::AppendMessage { message } => {
                    log_message(session_id, &message);
                    working.push(message);
                    continue;
                }
                Effect::Commit => {
                    committed = true;
                    continue;
                }
                Effect::RequestResponse => {
                    tracing::debug!(
                        session_id = %session_id,
                        model = self.responder.model_id(),
                        round_trip = state.round_trip(),
                        messages = working.len(),
                        "Requesting response"
                    );
                    self.request_response(&working, &tool_defs).await
                }
                Effect::DispatchTools { calls } => self.dispatch_tools(session_id, &calls).await,
            };

            let result = transition(&state, &context, event).map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "State machine rejected event");
                TurnFailure::internal(e.to_string())
            })?;
            state = result.new_state;
            effects.extend(result.effects);
        }

        match state {
            ConvState::Done if committed => {
                let final_message = working
                    .last()
                    .cloned()
                    .ok_or_else(|| TurnFailure::internal("turn finished with empty history"))?;
                Ok(TurnOutcome {
                    history: working,
                    final_message,
                })
            }
            ConvState::Failed { failure } => {
                tracing::warn!(
                    session_id = %session_id,
                    reason = failure.reason(),
                    error = %failure,
                    "Turn failed"
                );
                Err(failure)
            }
            other => Err(TurnFailure::internal(format!(
                "turn stopped without finishing: {other:?}"
            ))),
        }
    }

    /// Run a turn against a session buffer, replacing its contents on success.
    /// On failure the buffer is left exactly as it was.
    pub async fn run_turn(
        &self,
        session_id: &str,
        buffer: &mut HistoryBuffer,
        user_text: &str,
    ) -> Result<Message, TurnFailure> {
        let outcome = self.turn(session_id, &buffer.snapshot(), user_text).await?;
        buffer.replace(outcome.history);
        Ok(outcome.final_message)
    }

    async fn request_response(&self, working: &[Message], tools: &[ToolDefinition]) -> Event {
        let timeout = self.config.responder_timeout;
        match tokio::time::timeout(timeout, self.responder.respond(working, tools)).await {
            Ok(Ok(reply)) => Event::ResponderReplied { reply },
            Ok(Err(error)) => Event::ResponderFailed { error },
            Err(_) => Event::ResponderFailed {
                error: LlmError::network(format!(
                    "Responder timed out after {}s",
                    timeout.as_secs_f32()
                )),
            },
        }
    }

    /// Run all calls concurrently; results come back in request order
    async fn dispatch_tools(&self, session_id: &str, calls: &[ToolCallRequest]) -> Event {
        let results = join_all(calls.iter().map(|call| self.invoke_one(session_id, call))).await;
        Event::ToolsCompleted { results }
    }

    async fn invoke_one(&self, session_id: &str, call: &ToolCallRequest) -> ToolResult {
        let cancel = CancellationToken::new();
        let ctx = ToolContext::new(cancel.clone(), session_id);
        let timeout = self.config.tool_timeout;

        let result = match tokio::time::timeout(timeout, self.tools.invoke(call, ctx)).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                ToolResult::error(
                    &call.id,
                    format!("Tool {} timed out after {}s", call.name, timeout.as_secs_f32()),
                )
            }
        };

        // Results always answer the call that produced them
        ToolResult {
            call_id: call.id.clone(),
            ..result
        }
    }
}

fn log_message(session_id: &str, message: &Message) {
    match message {
        Message::User { text } => {
            tracing::info!(session_id = %session_id, text = %text, "User message");
        }
        Message::System { text } => {
            tracing::debug!(session_id = %session_id, text = %text, "System message");
        }
        Message::Assistant { text, tool_calls } if tool_calls.is_empty() => {
            tracing::info!(
                session_id = %session_id,
                text = text.as_deref().unwrap_or_default(),
                "Assistant answer"
            );
        }
        Message::Assistant { tool_calls, .. } => {
            for call in tool_calls {
                tracing::info!(
                    session_id = %session_id,
                    call_id = %call.id,
                    tool = %call.name,
                    arguments = %call.arguments,
                    "Tool call"
                );
            }
        }
        Message::ToolResult {
            call_id,
            content,
            is_error,
        } => {
            tracing::info!(
                session_id = %session_id,
                call_id = %call_id,
                is_error = *is_error,
                bytes = content.len(),
                "Tool result"
            );
        }
    }
}
