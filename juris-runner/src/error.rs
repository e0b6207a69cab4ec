//! Error types for the `juris-runner` crate.

use juris_core::JurisError;
use juris_rag::RagError;
use juris_session::SessionError;
use thiserror::Error;

/// Errors that fail a single [`ask`](crate::LegalAssistant::ask).
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A pipeline stage exceeded its time budget.
    #[error("Stage '{stage}' timed out")]
    Timeout { stage: &'static str },

    /// The request itself is unusable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or inconsistent assistant configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Retrieval(RagError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Core(#[from] JurisError),
}

impl RunnerError {
    /// Whether the deployment itself is misconfigured.
    pub fn is_config(&self) -> bool {
        match self {
            RunnerError::ConfigError(_) => true,
            RunnerError::Retrieval(e) => e.is_config(),
            RunnerError::Core(JurisError::Config(_)) => true,
            _ => false,
        }
    }
}

impl From<RagError> for RunnerError {
    fn from(e: RagError) -> Self {
        match e {
            RagError::Timeout(stage) => RunnerError::Timeout { stage },
            other => RunnerError::Retrieval(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
