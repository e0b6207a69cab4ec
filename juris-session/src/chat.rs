//! Persisted chats owned by a user.
//!
//! Every operation is keyed by chat id and owner id. Apart from
//! [`ChatStore::is_owned_by_other`], a chat owned by someone else is
//! indistinguishable from a missing one.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use juris_core::{Content, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, SessionError};

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// Title for a chat opened with `first_message`.
pub fn chat_title(first_message: &str) -> String {
    first_message.trim().chars().take(TITLE_MAX_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id: chat_id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// The message as a conversation turn.
    pub fn to_content(&self) -> Content {
        Content::new(self.role).with_text(self.content.clone())
    }
}

/// Durable chat and message storage.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn get_chat(&self, chat_id: &str, owner_id: &str) -> Result<Option<Chat>>;

    /// Whether `chat_id` exists and belongs to someone other than `owner_id`.
    async fn is_owned_by_other(&self, chat_id: &str, owner_id: &str) -> Result<bool>;

    /// # Errors
    ///
    /// [`SessionError::ChatExists`] if `chat_id` is taken, by any owner.
    async fn create_chat(&self, chat_id: &str, owner_id: &str, title: &str) -> Result<Chat>;

    /// # Errors
    ///
    /// [`SessionError::ChatNotFound`] unless `owner_id` owns `chat_id`.
    async fn append_message(
        &self,
        chat_id: &str,
        owner_id: &str,
        role: Role,
        content: &str,
    ) -> Result<Message>;

    /// Append several messages as one unit: either all are stored, in
    /// order, or none are.
    ///
    /// # Errors
    ///
    /// [`SessionError::ChatNotFound`] unless `owner_id` owns `chat_id`.
    async fn append_messages(
        &self,
        chat_id: &str,
        owner_id: &str,
        messages: &[(Role, &str)],
    ) -> Result<Vec<Message>>;

    /// Messages oldest first.
    ///
    /// # Errors
    ///
    /// [`SessionError::ChatNotFound`] unless `owner_id` owns `chat_id`.
    async fn list_messages(&self, chat_id: &str, owner_id: &str) -> Result<Vec<Message>>;
}

#[derive(Debug)]
struct StoredChat {
    chat: Chat,
    messages: Vec<Message>,
}

/// A [`ChatStore`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    chats: RwLock<HashMap<String, StoredChat>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(chat_id: &str) -> SessionError {
    SessionError::ChatNotFound { chat_id: chat_id.to_string() }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn get_chat(&self, chat_id: &str, owner_id: &str) -> Result<Option<Chat>> {
        let chats = self.chats.read().await;
        Ok(chats
            .get(chat_id)
            .filter(|stored| stored.chat.owner_id == owner_id)
            .map(|stored| stored.chat.clone()))
    }

    async fn is_owned_by_other(&self, chat_id: &str, owner_id: &str) -> Result<bool> {
        let chats = self.chats.read().await;
        Ok(chats.get(chat_id).is_some_and(|stored| stored.chat.owner_id != owner_id))
    }

    async fn create_chat(&self, chat_id: &str, owner_id: &str, title: &str) -> Result<Chat> {
        let mut chats = self.chats.write().await;
        if chats.contains_key(chat_id) {
            return Err(SessionError::ChatExists { chat_id: chat_id.to_string() });
        }
        let chat = Chat {
            id: chat_id.to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
        };
        chats.insert(chat_id.to_string(), StoredChat { chat: chat.clone(), messages: Vec::new() });
        Ok(chat)
    }

    async fn append_message(
        &self,
        chat_id: &str,
        owner_id: &str,
        role: Role,
        content: &str,
    ) -> Result<Message> {
        let mut chats = self.chats.write().await;
        let stored = chats
            .get_mut(chat_id)
            .filter(|stored| stored.chat.owner_id == owner_id)
            .ok_or_else(|| not_found(chat_id))?;
        let message = Message::new(chat_id, role, content);
        stored.messages.push(message.clone());
        Ok(message)
    }

    async fn append_messages(
        &self,
        chat_id: &str,
        owner_id: &str,
        messages: &[(Role, &str)],
    ) -> Result<Vec<Message>> {
        let mut chats = self.chats.write().await;
        let stored = chats
            .get_mut(chat_id)
            .filter(|stored| stored.chat.owner_id == owner_id)
            .ok_or_else(|| not_found(chat_id))?;
        let appended: Vec<Message> = messages
            .iter()
            .map(|(role, content)| Message::new(chat_id, *role, *content))
            .collect();
        stored.messages.extend(appended.iter().cloned());
        Ok(appended)
    }

    async fn list_messages(&self, chat_id: &str, owner_id: &str) -> Result<Vec<Message>> {
        let chats = self.chats.read().await;
        chats
            .get(chat_id)
            .filter(|stored| stored.chat.owner_id == owner_id)
            .map(|stored| stored.messages.clone())
            .ok_or_else(|| not_found(chat_id))
    }
}
