//! Builds the generation request for one turn.

use juris_core::{Content, ContextDocument, GenerateConfig, LlmRequest};
use juris_rag::Passage;

/// Merges retrieved passages, prior turns and the system instruction into a
/// single [`LlmRequest`].
///
/// Passages travel as [`ContextDocument`]s, apart from the transcript. The
/// new user turn always comes last.
#[derive(Debug, Clone)]
pub struct ConversationAssembler {
    system_instruction: String,
    config: Option<GenerateConfig>,
}

impl ConversationAssembler {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self { system_instruction: system_instruction.into(), config: None }
    }

    pub fn with_config(mut self, config: GenerateConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn assemble(
        &self,
        passages: &[Passage],
        history: &[Content],
        new_user_text: &str,
    ) -> LlmRequest {
        let mut contents = Vec::with_capacity(history.len() + 1);
        contents.extend(history.iter().cloned());
        contents.push(Content::user(new_user_text));

        let mut request = LlmRequest::new(contents)
            .with_system_instruction(self.system_instruction.clone())
            .with_documents(passages.iter().map(ContextDocument::from).collect());
        request.config = self.config.clone();
        request
    }
}
