//! Bounded conversation history
//!
//! Holds at most `capacity` messages. Eviction removes whole groups from the
//! oldest end: an assistant message that requested tools is evicted together
//! with the tool results answering it, so the remaining sequence never starts
//! with an orphaned tool result.

mod message;

#[cfg(test)]
mod proptests;

pub use message::{Message, ToolCallRequest, ToolResult};

use std::collections::VecDeque;

/// Default maximum number of messages kept per session
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Ordered, capacity-bounded sequence of messages
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message, trimming from the front if over capacity
    pub fn append(&mut self, message: Message) {
        self.messages.push_back(message);
        self.trim();
    }

    /// Current ordered contents
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Replace the whole history, then apply the trim policy
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages.into();
        self.trim();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    fn trim(&mut self) {
        let before = self.messages.len();
        while self.messages.len() > self.capacity {
            self.evict_oldest_group();
        }
        // A front tool result can only appear if the caller replaced the
        // history with one; its call is already gone.
        while self.messages.front().is_some_and(Message::is_tool_result) {
            self.messages.pop_front();
        }
        let evicted = before - self.messages.len();
        if evicted > 0 {
            tracing::debug!(
                evicted,
                remaining = self.messages.len(),
                capacity = self.capacity,
                "Trimmed conversation history"
            );
        }
    }

    /// Remove the front message and every tool result that follows it
    fn evict_oldest_group(&mut self) {
        if self.messages.pop_front().is_none() {
            return;
        }
        while self.messages.front().is_some_and(Message::is_tool_result) {
            self.messages.pop_front();
        }
    }
}
