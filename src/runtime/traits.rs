//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the engine with mock implementations.

use crate::history::{Message, ToolCallRequest, ToolResult};
use crate::llm::{ChatMessage, LlmError, LlmRequest, LlmService, ToolDefinition};
use crate::state_machine::Reply;
use crate::system_prompt::current_system_prompt;
use crate::tools::{ToolContext, ToolRegistry};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the next reply for a conversation
#[async_trait]
pub trait ResponderModel: Send + Sync {
    /// Ask for the next reply given the working history and offered tools
    async fn respond(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Reply, LlmError>;

    fn model_id(&self) -> &str;
}

/// Runs tool calls
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run one call. Never fails: problems come back as error results.
    async fn invoke(&self, request: &ToolCallRequest, ctx: ToolContext) -> ToolResult;

    /// Get tool definitions for LLM
    fn definitions(&self) -> Vec<ToolDefinition>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ResponderModel + ?Sized> ResponderModel for Arc<T> {
    async fn respond(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Reply, LlmError> {
        (**self).respond(messages, tools).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

#[async_trait]
impl<T: ToolInvoker + ?Sized> ToolInvoker for Arc<T> {
    async fn invoke(&self, request: &ToolCallRequest, ctx: ToolContext) -> ToolResult {
        (**self).invoke(request, ctx).await
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        (**self).definitions()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Responder backed by a chat completion service
pub struct LlmResponder {
    llm: Arc<dyn LlmService>,
    max_tokens: u32,
}

impl LlmResponder {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            llm,
            max_tokens: 4096,
        }
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> LlmRequest {
        let mut system = current_system_prompt();
        let mut chat = Vec::with_capacity(messages.len());

        for message in messages {
            match message {
                Message::System { text } => {
                    system.push_str("\n\n");
                    system.push_str(text);
                }
                Message::User { text } => chat.push(ChatMessage::user(text.clone())),
                Message::Assistant { text, tool_calls } => chat.push(ChatMessage::Assistant {
                    content: text.clone().filter(|t| !t.is_empty()),
                    tool_calls: tool_calls.clone(),
                }),
                Message::ToolResult {
                    call_id,
                    content,
                    is_error,
                } => chat.push(ChatMessage::tool(call_id.clone(), content.clone(), *is_error)),
            }
        }

        LlmRequest {
            system,
            messages: chat,
            tools: tools.to_vec(),
            max_tokens: self.max_tokens,
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl ResponderModel for LlmResponder {
    async fn respond(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Reply, LlmError> {
        let request = self.build_request(messages, tools);
        let response = self.llm.complete(&request).await?;

        if response.wants_tools() {
            Ok(Reply::ToolCalls {
                text: response.text,
                calls: response.tool_calls,
            })
        } else {
            Ok(Reply::Answer {
                text: response.text.unwrap_or_default(),
            })
        }
    }

    fn model_id(&self) -> &str {
        self.llm.model_id()
    }
}

/// Adapter to use `ToolRegistry` as the tool invoker
pub struct ToolRegistryInvoker {
    registry: ToolRegistry,
}

impl ToolRegistryInvoker {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistryInvoker {
    async fn invoke(&self, request: &ToolCallRequest, ctx: ToolContext) -> ToolResult {
        match self
            .registry
            .execute(&request.name, request.arguments.clone(), ctx)
            .await
        {
            Some(output) if output.success => ToolResult::success(&request.id, output.output),
            Some(output) => ToolResult::error(&request.id, output.output),
            None => ToolResult::error(&request.id, format!("Unknown tool: {}", request.name)),
        }
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }
}
