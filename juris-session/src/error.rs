//! Error types for the `juris-session` crate.

use juris_core::JurisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No chat with this id exists for the requesting owner.
    #[error("Chat '{chat_id}' not found")]
    ChatNotFound { chat_id: String },

    /// A chat with this id already exists.
    #[error("Chat '{chat_id}' already exists")]
    ChatExists { chat_id: String },

    /// The storage backend failed.
    #[error("Storage error ({backend}): {message}")]
    Storage { backend: String, message: String },
}

impl From<SessionError> for JurisError {
    fn from(e: SessionError) -> Self {
        JurisError::Session(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
