//! Memory port — append-ordered conversation log.
//!
//! The store is externally owned: the dispatcher appends the outbound user
//! message and the model's reply after a successful call and prepends
//! whatever the store returns on the next one. Windowing and eviction
//! policy belong to the implementation, not the core.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::message::Message;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// External conversation store.
pub trait ChatMemory: Send {
    /// Stored messages, oldest first, already windowed by the store's own
    /// policy.
    fn messages(&self) -> Vec<Message>;

    fn append(&mut self, message: Message);
}

/// Shared handle the service and its owner both hold.
pub type SharedMemory = Arc<Mutex<dyn ChatMemory>>;

/// Wrap a store in the shared handle the service builder accepts.
pub fn shared(memory: impl ChatMemory + 'static) -> SharedMemory {
    Arc::new(Mutex::new(memory))
}

// ── Bundled store ─────────────────────────────────────────────────────────────

/// Default maximum number of retained messages before FIFO eviction.
const DEFAULT_WINDOW_CAP: usize = 50;

/// In-process message window with a FIFO cap — oldest messages dropped
/// first.
pub struct MessageWindowMemory {
    id: ConversationId,
    cap: usize,
    messages: VecDeque<Message>,
}

impl MessageWindowMemory {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            id: ConversationId::new(),
            cap: cap.unwrap_or(DEFAULT_WINDOW_CAP),
            messages: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }
}

impl ChatMemory for MessageWindowMemory {
    fn messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    fn append(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.cap {
            self.messages.pop_front();
        }
    }
}
