use std::fmt::{self, Formatter};
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{
    Client, ClientBuilder, RequestBuilder, Response,
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use tracing::{Level, Span, instrument};
use url::Url;

use super::types::{
    BatchContentEmbeddingResponse, BatchEmbedContentsRequest, ContentEmbeddingResponse,
    EmbedContentRequest, GenerateContentRequest, GenerationResponse,
};

static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("unreachable error: failed to parse default base URL")
});

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Model {
    #[default]
    #[serde(rename = "models/gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "models/gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    #[serde(rename = "models/gemini-2.5-pro")]
    Gemini25Pro,
    #[serde(rename = "models/text-embedding-004")]
    TextEmbedding004,
    #[serde(untagged)]
    Custom(String),
}

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini25Flash => "models/gemini-2.5-flash",
            Model::Gemini25FlashLite => "models/gemini-2.5-flash-lite",
            Model::Gemini25Pro => "models/gemini-2.5-pro",
            Model::TextEmbedding004 => "models/text-embedding-004",
            Model::Custom(model) => model,
        }
    }

    /// Resolve a user-supplied model name, accepting both `gemini-2.5-flash`
    /// and `models/gemini-2.5-flash`.
    pub fn from_name(name: &str) -> Self {
        let qualified =
            if name.starts_with("models/") { name.to_string() } else { format!("models/{name}") };
        match qualified.as_str() {
            "models/gemini-2.5-flash" => Model::Gemini25Flash,
            "models/gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "models/gemini-2.5-pro" => Model::Gemini25Pro,
            "models/text-embedding-004" => Model::TextEmbedding004,
            _ => Model::Custom(qualified),
        }
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Self::from_name(&model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Self::from_name(model)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to parse API key"))]
    InvalidApiKey { source: InvalidHeaderValue },

    #[snafu(display("failed to construct URL (probably incorrect model name): {suffix}"))]
    ConstructUrl { source: url::ParseError, suffix: String },

    #[snafu(display("failed to build HTTP client"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("failed to perform request"))]
    PerformRequest { source: reqwest::Error },

    #[snafu(display(
        "bad response from server; code {code}; description: {}",
        description.as_deref().unwrap_or("none")
    ))]
    BadResponse {
        /// HTTP status code
        code: u16,
        /// HTTP error description
        description: Option<String>,
    },

    #[snafu(display("failed to decode response body"))]
    DecodeResponse { source: reqwest::Error },
}

/// Client for the Gemini `generateContent` and embedding endpoints.
pub struct GeminiClient {
    http_client: Client,
    pub model: Model,
    base_url: Url,
}

impl GeminiClient {
    /// Create a client for the given API key and model with default settings.
    pub fn new<K: Into<String>, M: Into<Model>>(api_key: K, model: M) -> Result<Self, Error> {
        GeminiBuilder::new(api_key).with_model(model).build()
    }

    /// Check the response status code and return an error if it is not successful
    #[instrument(skip_all, err)]
    async fn check_response(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.ok();
            BadResponseSnafu { code: status.as_u16(), description }.fail()
        } else {
            Ok(response)
        }
    }

    /// Build, send and check a request, then hand the response to `deserializer`.
    #[instrument(skip_all)]
    async fn perform_request<
        B: FnOnce(&Client) -> RequestBuilder,
        D: AsyncFn(Response) -> Result<T, Error>,
        T,
    >(
        &self,
        builder: B,
        deserializer: D,
    ) -> Result<T, Error> {
        let request = builder(&self.http_client);
        let response = request.send().await.context(PerformRequestSnafu)?;
        tracing::debug!("response received successfully");
        let response = Self::check_response(response).await?;
        deserializer(response).await
    }

    #[instrument(skip(self, body), fields(request.url = %url))]
    async fn post_json<Req: Serialize, Res: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &Req,
    ) -> Result<Res, Error> {
        self.perform_request(
            |c| c.post(url).json(body),
            async |r| r.json().await.context(DecodeResponseSnafu),
        )
        .await
    }

    /// Generate content
    #[instrument(skip_all, fields(
        model = %self.model,
        messages.parts.count = request.contents.len(),
        tools.present = request.tools.is_some(),
        system.instruction.present = request.system_instruction.is_some(),
        usage.prompt_tokens,
        usage.candidates_tokens,
        usage.total_tokens,
    ), ret(level = Level::TRACE), err)]
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResponse, Error> {
        let url = self.build_url("generateContent")?;
        let response: GenerationResponse = self.post_json(url, request).await?;

        if let Some(usage) = &response.usage_metadata {
            #[rustfmt::skip]
            Span::current()
                .record("usage.prompt_tokens", usage.prompt_token_count)
                .record("usage.candidates_tokens", usage.candidates_token_count)
                .record("usage.total_tokens", usage.total_token_count);
        }

        Ok(response)
    }

    /// Embed content
    #[instrument(skip_all, fields(
        model = %self.model,
        task.type = request.task_type.as_ref().map(|t| format!("{:?}", t)),
        task.output.dimensionality = request.output_dimensionality,
    ), err)]
    pub async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<ContentEmbeddingResponse, Error> {
        let url = self.build_url("embedContent")?;
        self.post_json(url, request).await
    }

    /// Batch embed content
    #[instrument(skip_all, fields(model = %self.model, batch.size = request.requests.len()), err)]
    pub async fn embed_content_batch(
        &self,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchContentEmbeddingResponse, Error> {
        let url = self.build_url("batchEmbedContents")?;
        self.post_json(url, request).await
    }

    /// Build a URL for the API
    #[instrument(skip(self), ret(level = Level::DEBUG))]
    fn build_url(&self, endpoint: &str) -> Result<Url, Error> {
        let suffix = format!("{}:{endpoint}", self.model);
        self.base_url.join(&suffix).context(ConstructUrlSnafu { suffix })
    }
}

/// A builder for [`GeminiClient`].
///
/// ```no_run
/// use std::time::Duration;
/// use juris_model::gemini::{GeminiBuilder, Model};
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiBuilder::new("YOUR_API_KEY")
///     .with_model(Model::Gemini25Pro)
///     .with_timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiBuilder {
    api_key: String,
    model: Model,
    client_builder: ClientBuilder,
    base_url: Url,
    timeout: Option<Duration>,
}

impl GeminiBuilder {
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self {
            api_key: key.into(),
            model: Model::default(),
            client_builder: ClientBuilder::default(),
            base_url: DEFAULT_BASE_URL.clone(),
            timeout: None,
        }
    }

    pub fn with_model<M: Into<Model>>(mut self, model: M) -> Self {
        self.model = model.into();
        self
    }

    /// Sets a custom `reqwest::ClientBuilder`.
    pub fn with_http_client(mut self, client_builder: ClientBuilder) -> Self {
        self.client_builder = client_builder;
        self
    }

    /// Overrides the API base URL, e.g. for a proxy or a local stub server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Per-request timeout applied by the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<GeminiClient, Error> {
        let mut api_key = HeaderValue::from_str(&self.api_key).context(InvalidApiKeySnafu)?;
        // Keeps the key out of request logs.
        api_key.set_sensitive(true);
        let headers = HeaderMap::from_iter([(HeaderName::from_static("x-goog-api-key"), api_key)]);

        let mut client_builder = self.client_builder.default_headers(headers);
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let http_client = client_builder.build().context(BuildClientSnafu)?;

        Ok(GeminiClient { http_client, model: self.model, base_url: self.base_url })
    }
}
