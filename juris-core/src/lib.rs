//! # juris-core
//!
//! Shared vocabulary for the juris legal assistant: conversation turns,
//! the [`Llm`] model seam, the [`Tool`] seam and the common error type.

pub mod content;
pub mod error;
pub mod llm;
pub mod tool;

pub use content::{Content, FunctionCall, FunctionResponse, Part, Role};
pub use error::{JurisError, Result};
pub use llm::{
    ContextDocument, FunctionDeclaration, GenerateConfig, Llm, LlmRequest, LlmResponse,
    UsageMetadata,
};
pub use tool::Tool;
