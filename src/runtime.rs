//! Runtime for executing turns
//!
//! Drives the pure state machine, performing the I/O its effects ask for.

mod engine;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use engine::{ConversationEngine, EngineConfig};
pub use traits::*;

use std::sync::Arc;

/// Engine over trait objects, shared by the HTTP and CLI shells
pub type SharedEngine = ConversationEngine<Arc<dyn ResponderModel>, Arc<dyn ToolInvoker>>;
