//! Conversation message types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the responder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique within a turn; tool results refer back to it
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of a single tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub payload: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            payload: payload.into(),
            is_error: false,
        }
    }

    pub fn error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            payload: message.into(),
            is_error: true,
        }
    }
}

/// A single entry in a conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        text: String,
    },
    System {
        text: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    ToolResult {
        call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User { text: text.into() }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Message::System { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(text: Option<String>, calls: Vec<ToolCallRequest>) -> Self {
        Message::Assistant {
            text,
            tool_calls: calls,
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Message::ToolResult {
            call_id: result.call_id,
            content: result.payload,
            is_error: result.is_error,
        }
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::User { text } | Message::System { text } => Some(text),
            Message::Assistant { text, .. } => text.as_deref(),
            Message::ToolResult { content, .. } => Some(content),
        }
    }

    /// Tool calls requested by this message (empty unless assistant)
    pub fn requested_calls(&self) -> &[ToolCallRequest] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Message::ToolResult { .. })
    }
}
