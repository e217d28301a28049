//! Turn state types

use crate::history::ToolCallRequest;
use crate::llm::LlmErrorKind;
use serde::Serialize;
use thiserror::Error;

/// Default cap on responder round trips within one turn
pub const DEFAULT_MAX_ROUND_TRIPS: u32 = 10;

/// State of a single turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Responder call in flight for the given round trip (1-based)
    AwaitingResponse {
        round_trip: u32,
        /// Call ids already used earlier in this turn
        call_ids: Vec<String>,
    },

    /// Tool calls from the last reply are running
    DispatchingTools {
        round_trip: u32,
        /// Calls awaiting results, in the order the responder issued them
        pending: Vec<ToolCallRequest>,
        /// Every call id used this turn, `pending` included
        call_ids: Vec<String>,
    },

    /// Final answer produced; working history is ready to commit
    Done,

    /// Turn aborted; nothing is committed
    Failed { failure: TurnFailure },
}

impl ConvState {
    /// State a turn starts in
    pub fn initial() -> Self {
        ConvState::AwaitingResponse {
            round_trip: 1,
            call_ids: Vec::new(),
        }
    }

    /// Terminal states accept no further events
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConvState::Done | ConvState::Failed { .. })
    }

    pub fn round_trip(&self) -> Option<u32> {
        match self {
            ConvState::AwaitingResponse { round_trip, .. }
            | ConvState::DispatchingTools { round_trip, .. } => Some(*round_trip),
            ConvState::Done | ConvState::Failed { .. } => None,
        }
    }
}

/// Why a turn did not produce an answer
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TurnFailure {
    /// Responder failed or returned something unusable
    #[error("{message}")]
    ResponderUnavailable { kind: LlmErrorKind, message: String },

    #[error("Gave up after {limit} tool round trips without a final answer")]
    ToolLoopExceeded { limit: u32 },

    #[error("Another turn is already running on this session")]
    SessionBusy,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TurnFailure {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            TurnFailure::ResponderUnavailable { .. } => "responder_unavailable",
            TurnFailure::ToolLoopExceeded { .. } => "tool_loop_exceeded",
            TurnFailure::SessionBusy => "session_busy",
            TurnFailure::Internal { .. } => "internal",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TurnFailure::Internal {
            message: message.into(),
        }
    }
}

/// Context for a turn (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    /// Responder calls allowed before the turn fails
    pub max_round_trips: u32,
}

impl ConvContext {
    pub fn new(max_round_trips: u32) -> Self {
        Self {
            max_round_trips: max_round_trips.max(1),
        }
    }
}

impl Default for ConvContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUND_TRIPS)
    }
}
