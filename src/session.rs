//! In-memory conversation sessions
//!
//! Each session owns a `HistoryBuffer` behind its own async mutex. A turn
//! holds the lock for its whole duration; a second turn on the same session
//! is rejected instead of queued. A session created by a chat request whose
//! first turn fails is dropped again, so failed requests never accumulate
//! empty entries.

use crate::history::{HistoryBuffer, Message};
use crate::runtime::{ConversationEngine, ResponderModel, ToolInvoker};
use crate::state_machine::TurnFailure;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Session used by the original single-history endpoint
pub const DEFAULT_SESSION_ID: &str = "default";

type SharedHistory = Arc<Mutex<HistoryBuffer>>;

/// Answer produced by a turn on a session
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub message: Message,
    /// Session history length after the commit
    pub history_len: usize,
}

/// Registry of sessions keyed by id
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SharedHistory>>,
    capacity: usize,
}

impl SessionManager {
    /// `capacity` bounds every session's history
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Create an empty session with a fresh id
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.get_or_create(&id).await;
        id
    }

    /// Returns the session and whether this call created it
    async fn get_or_create(&self, id: &str) -> (SharedHistory, bool) {
        if let Some(history) = self.sessions.read().await.get(id) {
            return (history.clone(), false);
        }
        let mut sessions = self.sessions.write().await;
        if let Some(history) = sessions.get(id) {
            return (history.clone(), false);
        }
        tracing::info!(session_id = %id, capacity = self.capacity, "Created session");
        let history = Arc::new(Mutex::new(HistoryBuffer::new(self.capacity)));
        sessions.insert(id.to_string(), history.clone());
        (history, true)
    }

    /// Drop the entry if it still maps to `history`
    async fn remove_entry(&self, id: &str, history: &SharedHistory) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(id) {
            Some(current) if Arc::ptr_eq(current, history) => {
                sessions.remove(id);
                true
            }
            _ => false,
        }
    }

    async fn get(&self, id: &str) -> Option<SharedHistory> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Current history of a session, `None` if it does not exist. Waits for
    /// a running turn to finish.
    pub async fn history(&self, id: &str) -> Option<Vec<Message>> {
        let history = self.get(id).await?;
        let buffer = history.lock().await;
        Some(buffer.snapshot())
    }

    /// Clear a session's history. Returns false for unknown sessions and
    /// fails with `SessionBusy` while a turn is running.
    pub async fn reset(&self, id: &str) -> Result<bool, TurnFailure> {
        let Some(history) = self.get(id).await else {
            return Ok(false);
        };
        let mut buffer = history.try_lock().map_err(|_| TurnFailure::SessionBusy)?;
        buffer.clear();
        tracing::info!(session_id = %id, "Session reset");
        Ok(true)
    }

    /// Remove a session and its history. Returns false for unknown sessions
    /// and fails with `SessionBusy` while a turn is running.
    pub async fn delete(&self, id: &str) -> Result<bool, TurnFailure> {
        let Some(history) = self.get(id).await else {
            return Ok(false);
        };
        // Held across the removal so no turn can start on the entry meanwhile
        let _buffer = history.try_lock().map_err(|_| TurnFailure::SessionBusy)?;
        let removed = self.remove_entry(id, &history).await;
        if removed {
            tracing::info!(session_id = %id, "Session deleted");
        }
        Ok(removed)
    }

    /// Run a turn on the session, creating it if needed
    pub async fn run_turn<R, T>(
        &self,
        engine: &ConversationEngine<R, T>,
        id: &str,
        user_text: &str,
    ) -> Result<TurnReply, TurnFailure>
    where
        R: ResponderModel,
        T: ToolInvoker,
    {
        let (history, created) = self.get_or_create(id).await;
        let mut buffer = history.try_lock().map_err(|_| {
            tracing::warn!(session_id = %id, "Rejected turn: session busy");
            TurnFailure::SessionBusy
        })?;
        match engine.run_turn(id, &mut buffer, user_text).await {
            Ok(message) => Ok(TurnReply {
                message,
                history_len: buffer.len(),
            }),
            Err(failure) => {
                if created && buffer.is_empty() && self.remove_entry(id, &history).await {
                    tracing::debug!(session_id = %id, "Dropped session after failed first turn");
                }
                Err(failure)
            }
        }
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
