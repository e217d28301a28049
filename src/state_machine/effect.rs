//! Effects produced by state transitions

use crate::history::{Message, ToolCallRequest};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the turn's working history
    AppendMessage { message: Message },

    /// Call the responder with the working history
    RequestResponse,

    /// Run the calls concurrently and report all results together
    DispatchTools { calls: Vec<ToolCallRequest> },

    /// Replace the session history with the working history
    Commit,
}

impl Effect {
    pub fn append(message: Message) -> Self {
        Effect::AppendMessage { message }
    }
}
