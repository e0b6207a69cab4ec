//! Google Gemini backend.
//!
//! [`GeminiClient`] speaks the REST API directly over `reqwest`;
//! [`GeminiModel`] adapts it to the [`juris_core::Llm`] trait.

mod client;
pub mod convert;
mod model;
pub mod types;

pub use client::{Error, GeminiBuilder, GeminiClient, Model};
pub use model::GeminiModel;
pub use types::{
    BatchEmbedContentsRequest, ContentEmbedding, EmbedContentRequest, GenerateContentRequest,
    GenerationResponse, TaskType, WireContent, WirePart,
};
