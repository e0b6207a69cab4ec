//! Error type shared across the juris crates.

use thiserror::Error;

/// Errors raised at the boundaries between juris crates.
#[derive(Debug, Error)]
pub enum JurisError {
    /// The generative model call failed or returned an unusable response.
    #[error("Model error: {0}")]
    Model(String),

    /// A tool invocation failed.
    #[error("Tool error: {0}")]
    Tool(String),

    /// Conversation or chat storage failed.
    #[error("Session error: {0}")]
    Session(String),

    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for juris operations.
pub type Result<T> = std::result::Result<T, JurisError>;
