//! Scripted [`Llm`] for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use juris_core::{
    Content, FunctionCall, JurisError, Llm, LlmRequest, LlmResponse, Part, Result, Role,
};

/// An [`Llm`] that replays queued responses and records every request.
///
/// Once the queue is exhausted it answers with an empty response.
///
/// ```
/// use juris_model::MockLlm;
///
/// let llm = MockLlm::new("mock").with_text_response("criminal").with_error("upstream down");
/// ```
pub struct MockLlm {
    name: String,
    responses: Mutex<VecDeque<std::result::Result<LlmResponse, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, response: LlmResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_response(LlmResponse {
            content: Some(Content::model(text)),
            finish_reason: Some("STOP".to_string()),
            usage_metadata: None,
        })
    }

    /// Queue a reply whose parts are the given function calls.
    pub fn with_function_calls(self, calls: Vec<FunctionCall>) -> Self {
        let parts = calls.into_iter().map(Part::FunctionCall).collect();
        let content = Content { role: Role::Model, parts };
        self.with_response(LlmResponse { content: Some(content), ..Default::default() })
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(&self, entry: std::result::Result<LlmResponse, String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(entry);
        }
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, request: LlmRequest) -> Result<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(JurisError::Model(message)),
            None => Ok(LlmResponse::default()),
        }
    }
}
