//! Gemini embedding provider using the `juris-model` Gemini client.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use tracing::{debug, error};

use juris_model::gemini::{
    BatchEmbedContentsRequest, EmbedContentRequest, GeminiClient, Model, TaskType, WireContent,
    WirePart,
};

use crate::corpus::DEFAULT_DIMENSIONS;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Defaults to `text-embedding-004` (768 dimensions) with
/// [`TaskType::RetrievalQuery`], matching how queries are embedded against
/// corpora that were ingested with `RetrievalDocument`.
///
/// # Example
///
/// ```rust,ignore
/// use juris_rag::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::new("your-api-key")?;
/// let embedding = provider.embed("what is the penalty for theft").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: GeminiClient,
    task_type: TaskType,
    output_dimensionality: Option<i32>,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider using the given API key and `text-embedding-004`.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = GeminiClient::new(api_key, Model::TextEmbedding004).map_err(|e| {
            RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!("failed to create Gemini client: {e}"),
            }
        })?;
        Ok(Self::from_client(client))
    }

    /// Create a new provider from an existing [`GeminiClient`].
    pub fn from_client(client: GeminiClient) -> Self {
        Self {
            client,
            task_type: TaskType::RetrievalQuery,
            output_dimensionality: None,
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Set the task type used for embedding requests.
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Set the output dimensionality (truncates the embedding vector).
    pub fn with_output_dimensionality(mut self, dims: usize) -> Self {
        self.output_dimensionality = Some(dims as i32);
        self.dimensions = dims;
        self
    }

    fn request(&self, text: &str) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.client.model.as_str().to_string(),
            content: WireContent {
                role: None,
                parts: Some(vec![WirePart { text: Some(text.to_string()), ..Default::default() }]),
            },
            task_type: Some(self.task_type.clone()),
            output_dimensionality: self.output_dimensionality,
        }
    }

    fn map_err(e: juris_model::gemini::Error) -> RagError {
        error!(provider = "Gemini", error = %e, "embedding request failed");
        RagError::EmbeddingError { provider: "Gemini".into(), message: format!("{e}") }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let response =
            self.client.embed_content(&self.request(text)).await.map_err(Self::map_err)?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), "embedding batch");

        let request =
            BatchEmbedContentsRequest { requests: texts.iter().map(|t| self.request(t)).collect() };
        let response = self.client.embed_content_batch(&request).await.map_err(Self::map_err)?;
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
