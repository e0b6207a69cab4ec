//! # juris-rag
//!
//! Retrieval for the juris legal assistant.
//!
//! ```text
//! query ─► CorpusSelector ─► CorpusTag ─► CorpusRetriever
//!                                            │
//!              EmbeddingProvider ◄── SimilaritySearchClient ──► VectorStore
//!                                            │
//!                          threshold ─► metadata ─► page filters
//!                                            │
//!                                        Vec<Passage>
//! ```
//!
//! Backends are feature-gated: `gemini` enables
//! [`gemini::GeminiEmbeddingProvider`], `pgvector` enables
//! [`pgvector::PgVectorStore`]. [`InMemoryVectorStore`] is always available.

pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod inmemory;
#[cfg(feature = "pgvector")]
pub mod pgvector;
pub mod retriever;
pub mod search;
pub mod selector;
pub mod tool;
pub mod vectorstore;

pub use config::{DEFAULT_K, RetrievalOptions, RetrievalOptionsBuilder};
pub use corpus::{CorpusRegistry, CorpusSpec, CorpusTag, DEFAULT_DIMENSIONS};
pub use document::{CorpusRow, Passage};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use retriever::{
    CorpusRetriever, Retrieval, RetrievalOrchestrator, Retriever, apply_filters,
};
pub use search::SimilaritySearchClient;
pub use selector::{CLASSIFICATION_RULES, CorpusSelector, resolve_classification};
pub use tool::SectionLookupTool;
pub use vectorstore::VectorStore;
