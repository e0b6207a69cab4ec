//! The generative model seam.
//!
//! Every backend (Gemini, test doubles) implements [`Llm`]; the pipeline only
//! ever talks to `Arc<dyn Llm>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{Content, FunctionCall};
use crate::error::Result;

/// A tool the model may ask to invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A contextual document handed to the model next to the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    /// Short label such as the source article or page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
}

/// Sampling parameters forwarded to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
}

/// A single request to a generative model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system_instruction: Option<String>,
    pub documents: Vec<ContextDocument>,
    pub contents: Vec<Content>,
    pub tools: Vec<FunctionDeclaration>,
    pub config: Option<GenerateConfig>,
}

impl LlmRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self { contents, ..Default::default() }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_documents(mut self, documents: Vec<ContextDocument>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_tools(mut self, tools: Vec<FunctionDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_config(mut self, config: GenerateConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Token accounting reported by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: Option<i32>,
    pub candidates_token_count: Option<i32>,
    pub total_token_count: Option<i32>,
}

/// The model's reply to an [`LlmRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl LlmResponse {
    /// Text of the reply, or an empty string when the model produced none.
    pub fn text(&self) -> String {
        self.content.as_ref().map(Content::text).unwrap_or_default()
    }

    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.content
            .as_ref()
            .map(|c| c.function_calls().into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// A hosted generative model.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier, e.g. `gemini-2.5-flash`.
    fn name(&self) -> &str;

    /// Send one request and wait for the complete reply.
    async fn generate_content(&self, request: LlmRequest) -> Result<LlmResponse>;
}
