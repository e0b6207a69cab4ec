//! Assistant configuration.

use std::time::Duration;

use juris_rag::RetrievalOptions;

use crate::error::{Result, RunnerError};
use crate::generation::DEFAULT_MAX_TOOL_ROUNDS;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are a legal assistant. Answer the user's question using the legal passages \
provided with the conversation. Cite the section, article or page a passage comes \
from when you rely on it. When you need the exact wording of a numbered section, call \
the lookup_section tool. If the passages do not cover the question, say so plainly and \
do not invent provisions. You do not give formal legal advice.";

/// Time budget per pipeline stage. `None` disables the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub correction: Option<Duration>,
    pub classification: Option<Duration>,
    /// Query embedding plus similarity search.
    pub search: Option<Duration>,
    /// Each model call made while generating.
    pub generation: Option<Duration>,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            correction: Some(Duration::from_secs(10)),
            classification: Some(Duration::from_secs(10)),
            search: Some(Duration::from_secs(15)),
            generation: Some(Duration::from_secs(60)),
        }
    }
}

impl StageTimeouts {
    pub fn none() -> Self {
        Self { correction: None, classification: None, search: None, generation: None }
    }
}

/// Behaviour of a [`LegalAssistant`](crate::LegalAssistant).
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub system_instruction: String,
    pub retrieval: RetrievalOptions,
    /// Classify and retrieve. When false every answer is generated without
    /// passages.
    pub classify: bool,
    /// Run the grammar pass before classification.
    pub correct: bool,
    pub timeouts: StageTimeouts,
    pub max_tool_rounds: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            retrieval: RetrievalOptions::default(),
            classify: true,
            correct: false,
            timeouts: StageTimeouts::default(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl AssistantConfig {
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }
}

/// Builder for [`AssistantConfig`]. Unset fields keep their defaults.
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = instruction.into();
        self
    }

    pub fn retrieval(mut self, options: RetrievalOptions) -> Self {
        self.config.retrieval = options;
        self
    }

    pub fn classify(mut self, classify: bool) -> Self {
        self.config.classify = classify;
        self
    }

    pub fn correct(mut self, correct: bool) -> Self {
        self.config.correct = correct;
        self
    }

    pub fn timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.config.max_tool_rounds = rounds;
        self
    }

    /// # Errors
    ///
    /// Returns [`RunnerError::ConfigError`] if the system instruction is
    /// blank, a timeout is zero or the retrieval options are invalid.
    pub fn build(self) -> Result<AssistantConfig> {
        let config = self.config;
        if config.system_instruction.trim().is_empty() {
            return Err(RunnerError::ConfigError("system_instruction must not be empty".into()));
        }
        let timeouts = config.timeouts;
        let stages = [
            ("correction", timeouts.correction),
            ("classification", timeouts.classification),
            ("search", timeouts.search),
            ("generation", timeouts.generation),
        ];
        for (stage, limit) in stages {
            if limit.is_some_and(|d| d.is_zero()) {
                return Err(RunnerError::ConfigError(format!("{stage} timeout must be non-zero")));
            }
        }
        config.retrieval.validate().map_err(|e| RunnerError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}
