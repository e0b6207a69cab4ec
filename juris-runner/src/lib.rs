//! # juris-runner
//!
//! The legal assistant's request pipeline. [`LegalAssistant::ask`] takes an
//! [`AskRequest`] and returns the generated answer, composing:
//!
//! - [`Corrector`]: optional grammar pass over the user text
//! - [`juris_rag::RetrievalOrchestrator`]: corpus selection and retrieval
//! - [`ConversationAssembler`]: passages, history and instruction into one request
//! - [`GenerationClient`]: the model call, tool rounds and the fallback answer

pub mod assembler;
pub mod assistant;
pub mod config;
pub mod corrector;
pub mod error;
pub mod generation;

pub use assembler::ConversationAssembler;
pub use assistant::{AskRequest, LegalAssistant, LegalAssistantBuilder};
pub use config::{
    AssistantConfig, AssistantConfigBuilder, DEFAULT_SYSTEM_INSTRUCTION, StageTimeouts,
};
pub use corrector::Corrector;
pub use error::{Result, RunnerError};
pub use generation::{DEFAULT_MAX_TOOL_ROUNDS, FALLBACK_RESPONSE, GenerationClient};
