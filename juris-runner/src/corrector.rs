//! Optional spelling and grammar pass over the user's text.

use std::sync::Arc;
use std::time::Duration;

use juris_core::{Content, GenerateConfig, Llm, LlmRequest};
use tracing::{debug, instrument, warn};

pub const CORRECTION_INSTRUCTION: &str = "\
Correct the spelling and grammar of the user's message. Keep its meaning, \
language and legal terminology unchanged. Reply with the corrected message only.";

/// Rewrites user text before classification. Never fails: an error, a
/// timeout or an empty answer keeps the original text.
pub struct Corrector {
    llm: Arc<dyn Llm>,
    timeout: Option<Duration>,
}

impl Corrector {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[instrument(skip_all, fields(model = self.llm.name()))]
    pub async fn correct(&self, text: &str) -> String {
        let request = LlmRequest::new(vec![Content::user(text)])
            .with_system_instruction(CORRECTION_INSTRUCTION)
            .with_config(GenerateConfig { temperature: Some(0.0), ..Default::default() });

        let call = self.llm.generate_content(request);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("correction timed out, keeping original text");
                    return text.to_string();
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(response) => {
                let corrected = response.text().trim().to_string();
                if corrected.is_empty() {
                    return text.to_string();
                }
                debug!(changed = corrected != text, "text corrected");
                corrected
            }
            Err(e) => {
                warn!(error = %e, "correction failed, keeping original text");
                text.to_string()
            }
        }
    }
}
