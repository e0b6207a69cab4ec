//! # juris-session
//!
//! Where conversation history lives.
//!
//! Requests without a user read and write a [`ConversationStore`] keyed by
//! conversation id. Requests with a user go through a [`ChatStore`], which
//! persists chats and messages per owner. The `database` feature enables
//! [`database::PgChatStore`].

pub mod chat;
pub mod conversation;
#[cfg(feature = "database")]
pub mod database;
pub mod error;

pub use chat::{Chat, ChatStore, InMemoryChatStore, Message, TITLE_MAX_CHARS, chat_title};
pub use conversation::{ConversationStore, InMemoryConversationStore, LruConversationStore};
pub use error::{Result, SessionError};
