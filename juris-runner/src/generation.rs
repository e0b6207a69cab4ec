//! The generation call, including tool execution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use juris_core::{
    Content, FunctionCall, FunctionResponse, Llm, LlmRequest, LlmResponse, Part, Role, Tool,
};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Result, RunnerError};

/// Returned whenever the model produces no text.
pub const FALLBACK_RESPONSE: &str = "No response generated.";

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 3;

/// Sends an [`LlmRequest`] to the model and returns its text.
///
/// When tools are registered their declarations are attached to the
/// request. Function calls in a reply are executed and their results sent
/// back, for at most `max_tool_rounds` rounds. Empty output becomes
/// [`FALLBACK_RESPONSE`].
pub struct GenerationClient {
    llm: Arc<dyn Llm>,
    tools: HashMap<String, Arc<dyn Tool>>,
    max_tool_rounds: usize,
    timeout: Option<Duration>,
}

impl GenerationClient {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            tools: HashMap::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            timeout: None,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn with_tools(self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        tools.into_iter().fold(self, Self::with_tool)
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Budget for each model call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[instrument(skip_all, fields(model = self.llm.name(), tool_count = self.tools.len()))]
    pub async fn generate(&self, mut request: LlmRequest) -> Result<String> {
        if !self.tools.is_empty() {
            let mut declarations: Vec<_> = self.tools.values().map(|t| t.declaration()).collect();
            declarations.sort_by(|a, b| a.name.cmp(&b.name));
            request.tools = declarations;
        }

        let mut rounds = 0;
        loop {
            let response = self.call(request.clone()).await?;
            let calls = response.function_calls();
            if calls.is_empty() {
                return Ok(final_text(&response));
            }
            if rounds >= self.max_tool_rounds {
                warn!(rounds, "tool round limit reached");
                return Ok(final_text(&response));
            }
            rounds += 1;

            if let Some(content) = response.content {
                request.contents.push(content);
            }
            let mut results = Content::new(Role::User);
            for call in calls {
                results = results.with_part(Part::FunctionResponse(self.execute(call).await));
            }
            request.contents.push(results);
        }
    }

    async fn call(&self, request: LlmRequest) -> Result<LlmResponse> {
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.llm.generate_content(request))
                .await
                .map_err(|_| RunnerError::Timeout { stage: "generation" })?,
            None => self.llm.generate_content(request).await,
        };
        outcome.map_err(|e| {
            error!(error = %e, "generation failed");
            RunnerError::from(e)
        })
    }

    /// Tool failures are reported back to the model rather than failing
    /// the request.
    async fn execute(&self, call: FunctionCall) -> FunctionResponse {
        let response = match self.tools.get(&call.name) {
            Some(tool) => match tool.execute(call.args).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool call failed");
                    json!({ "error": e.to_string() })
                }
            },
            None => {
                warn!(tool = %call.name, "model called an unknown tool");
                json!({ "error": format!("unknown tool '{}'", call.name) })
            }
        };
        debug!(tool = %call.name, "tool call completed");
        FunctionResponse { name: call.name, response: wrap_response(response) }
    }
}

// Function responses must be JSON objects.
fn wrap_response(value: Value) -> Value {
    if value.is_object() { value } else { json!({ "result": value }) }
}

fn final_text(response: &LlmResponse) -> String {
    let text = response.text();
    if text.trim().is_empty() {
        info!(finish_reason = ?response.finish_reason, "model returned no text");
        FALLBACK_RESPONSE.to_string()
    } else {
        text
    }
}
