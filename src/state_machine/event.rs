//! Events that can occur during a turn

use crate::history::{ToolCallRequest, ToolResult};
use crate::llm::LlmError;

/// What the responder produced for one call
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Final assistant message
    Answer { text: String },
    /// One or more tool invocations, optionally with accompanying text
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

impl Reply {
    pub fn answer(text: impl Into<String>) -> Self {
        Reply::Answer { text: text.into() }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Reply::ToolCalls { text: None, calls }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    ResponderReplied { reply: Reply },
    ResponderFailed { error: LlmError },
    /// Results for every pending call, in request order
    ToolsCompleted { results: Vec<ToolResult> },
}
