//! Error types for the `juris-rag` crate.

use thiserror::Error;

/// Errors that can occur while selecting, searching or filtering corpora.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The classification model call failed.
    #[error("Classification error: {0}")]
    ClassificationError(String),

    /// A configuration mismatch: unknown corpus, wrong embedding
    /// dimensionality, invalid options. Never retried or absorbed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A retrieval stage exceeded its time budget.
    #[error("Timed out during {0}")]
    Timeout(&'static str),

    /// An error propagated from `juris-core`.
    #[error(transparent)]
    Core(#[from] juris_core::JurisError),
}

impl RagError {
    /// Whether this error reflects a broken deployment rather than a
    /// transient upstream failure.
    pub fn is_config(&self) -> bool {
        matches!(self, RagError::ConfigError(_))
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
