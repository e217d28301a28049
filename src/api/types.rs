//! API request and response types

use crate::history::Message;
use serde::{Deserialize, Serialize};

/// Body of the single-session search endpoint
#[derive(Debug, Deserialize)]
pub struct WebSearchRequest {
    pub search_input: String,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for a completed turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: Message,
    pub history_len: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Model information for API
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub description: String,
    pub context_window: usize,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable code
    pub reason: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            reason: reason.into(),
        }
    }
}
