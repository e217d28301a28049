//! HTTP API

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::llm::ModelRegistry;
use crate::runtime::SharedEngine;
use crate::session::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SharedEngine>,
    pub sessions: Arc<SessionManager>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(
        engine: Arc<SharedEngine>,
        sessions: Arc<SessionManager>,
        llm_registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            engine,
            sessions,
            llm_registry,
        }
    }
}
