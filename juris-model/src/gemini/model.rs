use async_trait::async_trait;
use juris_core::{JurisError, Llm, LlmRequest, LlmResponse, Result};
use tracing::{debug, error};

use super::client::{GeminiClient, Model};
use super::convert;

/// [`Llm`] implementation backed by the Gemini `generateContent` endpoint.
pub struct GeminiModel {
    client: GeminiClient,
    name: String,
}

impl GeminiModel {
    /// Create a model for `model_name`, e.g. `gemini-2.5-flash`.
    pub fn new(api_key: impl Into<String>, model_name: impl AsRef<str>) -> Result<Self> {
        let model = Model::from_name(model_name.as_ref());
        let client = GeminiClient::new(api_key, model)
            .map_err(|e| JurisError::Model(format!("failed to create Gemini client: {e}")))?;
        Ok(Self::from_client(client))
    }

    /// Wrap an already configured client (custom base URL, timeout, proxy).
    pub fn from_client(client: GeminiClient) -> Self {
        let name = client.model.as_str().trim_start_matches("models/").to_string();
        Self { client, name }
    }
}

#[async_trait]
impl Llm for GeminiModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, request: LlmRequest) -> Result<LlmResponse> {
        let wire_request = convert::to_generate_request(&request);
        debug!(
            model = %self.name,
            contents = wire_request.contents.len(),
            documents = request.documents.len(),
            tools = request.tools.len(),
            "sending generateContent request"
        );

        let response = self.client.generate_content(&wire_request).await.map_err(|e| {
            error!(model = %self.name, error = %e, "Gemini generateContent failed");
            JurisError::Model(format!("Gemini API error: {e}"))
        })?;

        Ok(convert::from_generation_response(&response))
    }
}
