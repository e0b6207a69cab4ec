//! Conversation history for sessions without a user.
//!
//! The pipeline only ever talks to [`ConversationStore`]; the unbounded
//! [`InMemoryConversationStore`] is the default and
//! [`LruConversationStore`] caps the number of conversations held.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use juris_core::Content;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::Result;

/// History keyed by conversation id.
///
/// Turns are append-only. `get` on an unknown id returns an empty history.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, conversation_id: &str) -> Result<Vec<Content>>;

    /// Append `turns` after any existing turns, in order.
    async fn append(&self, conversation_id: &str, turns: Vec<Content>) -> Result<()>;
}

/// Process-wide history with no eviction. Grows for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Vec<Content>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, conversation_id: &str) -> Result<Vec<Content>> {
        Ok(self.conversations.read().await.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn append(&self, conversation_id: &str, turns: Vec<Content>) -> Result<()> {
        self.conversations
            .write()
            .await
            .entry(conversation_id.to_string())
            .or_default()
            .extend(turns);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LruState {
    conversations: HashMap<String, Vec<Content>>,
    // Least recently used at the front.
    order: VecDeque<String>,
}

impl LruState {
    fn touch(&mut self, conversation_id: &str) {
        if let Some(pos) = self.order.iter().position(|id| id == conversation_id) {
            if let Some(id) = self.order.remove(pos) {
                self.order.push_back(id);
            }
        }
    }
}

/// Keeps at most `capacity` conversations, evicting the least recently
/// read or written one.
#[derive(Debug)]
pub struct LruConversationStore {
    capacity: usize,
    state: Mutex<LruState>,
}

impl LruConversationStore {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), state: Mutex::new(LruState::default()) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.conversations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.conversations.is_empty()
    }
}

#[async_trait]
impl ConversationStore for LruConversationStore {
    async fn get(&self, conversation_id: &str) -> Result<Vec<Content>> {
        let mut state = self.state.lock().await;
        let Some(turns) = state.conversations.get(conversation_id).cloned() else {
            return Ok(Vec::new());
        };
        state.touch(conversation_id);
        Ok(turns)
    }

    async fn append(&self, conversation_id: &str, turns: Vec<Content>) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.conversations.get_mut(conversation_id) {
            existing.extend(turns);
            state.touch(conversation_id);
            return Ok(());
        }

        state.conversations.insert(conversation_id.to_string(), turns);
        state.order.push_back(conversation_id.to_string());
        while state.order.len() > self.capacity {
            if let Some(evicted) = state.order.pop_front() {
                state.conversations.remove(&evicted);
                debug!(conversation.id = %evicted, "conversation evicted");
            }
        }
        Ok(())
    }
}
