//! Legal-domain classification of a query.
//!
//! The model is asked for a single tag; its free-text answer is resolved
//! against [`CLASSIFICATION_RULES`], an ordered table where the first rule
//! whose keywords all appear in the answer wins.

use std::sync::Arc;

use juris_core::{Content, GenerateConfig, Llm, LlmRequest};
use tracing::{debug, instrument};

use crate::corpus::CorpusTag;
use crate::error::{RagError, Result};

/// Ordered resolution table. `criminal` + `procedure` must precede plain
/// `criminal`.
pub const CLASSIFICATION_RULES: &[(&[&str], CorpusTag)] = &[
    (&["criminal", "procedure"], CorpusTag::CriminalProcedure),
    (&["constitution"], CorpusTag::Constitution),
    (&["criminal"], CorpusTag::Criminal),
    (&["civil"], CorpusTag::Civil),
];

/// Instruction sent with every classification request.
pub const CLASSIFICATION_INSTRUCTION: &str = "\
You classify legal questions. Reply with exactly one of the following tags and nothing else:
constitution - constitutional rights, state organs, citizenship
criminal - crimes, offences and their penalties
civil - contracts, property, family, inheritance, obligations
criminal_procedure - arrest, investigation, trial and appeal in criminal cases
none - the question is not about law";

/// Resolve a model answer to a corpus. Empty, `none` or unrecognised
/// answers resolve to `None`.
pub fn resolve_classification(response: &str) -> Option<CorpusTag> {
    let normalized = response.trim().to_lowercase();
    if normalized.is_empty() || normalized == "none" {
        return None;
    }
    CLASSIFICATION_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|k| normalized.contains(k)))
        .map(|(_, tag)| *tag)
}

/// Picks the corpus a query should be answered from.
pub struct CorpusSelector {
    llm: Arc<dyn Llm>,
    instruction: String,
}

impl CorpusSelector {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, instruction: CLASSIFICATION_INSTRUCTION.to_string() }
    }

    /// Replace the default instruction, e.g. to describe a different
    /// jurisdiction's corpora. The tag names must stay the same.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Ask the model which corpus `query` belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ClassificationError`] if the model call fails.
    /// Callers are expected to treat that as `None`.
    #[instrument(skip_all, fields(model = self.llm.name()))]
    pub async fn classify(&self, query: &str) -> Result<Option<CorpusTag>> {
        let request = LlmRequest::new(vec![Content::user(query)])
            .with_system_instruction(self.instruction.clone())
            .with_config(GenerateConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(16),
                ..Default::default()
            });

        let response = self
            .llm
            .generate_content(request)
            .await
            .map_err(|e| RagError::ClassificationError(e.to_string()))?;

        let answer = response.text();
        let tag = resolve_classification(&answer);
        debug!(answer = %answer.trim(), corpus = ?tag, "query classified");
        Ok(tag)
    }
}
