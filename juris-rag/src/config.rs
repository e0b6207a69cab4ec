//! Retrieval options shared by every corpus retriever.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Result count used when [`RetrievalOptions::k`] is unset.
pub const DEFAULT_K: usize = 5;

/// Per-request retrieval options. Every field is optional; an unset field
/// means "no filter" for that stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalOptions {
    /// Maximum number of passages requested from the search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    /// Passages scoring below this value are dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
    /// Every entry must equal the passage's metadata value for that key.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata_filter: HashMap<String, String>,
    /// Keep only passages on this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_filter: Option<u32>,
}

impl RetrievalOptions {
    /// Create a new builder for constructing validated [`RetrievalOptions`].
    pub fn builder() -> RetrievalOptionsBuilder {
        RetrievalOptionsBuilder::default()
    }

    /// The search limit: `k` if set, otherwise [`DEFAULT_K`].
    pub fn limit(&self) -> usize {
        self.k.unwrap_or(DEFAULT_K)
    }

    /// Check option ranges. Called by the builder and by retrievers before
    /// searching, since options may also arrive deserialized.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `k == 0`
    /// - `similarity_threshold` is outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.k == Some(0) {
            return Err(RagError::ConfigError("k must be greater than zero".to_string()));
        }
        if let Some(t) = self.similarity_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(RagError::ConfigError(format!(
                    "similarity_threshold ({t}) must be between 0 and 1"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for constructing validated [`RetrievalOptions`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalOptionsBuilder {
    options: RetrievalOptions,
}

impl RetrievalOptionsBuilder {
    /// Set the number of passages to request.
    pub fn k(mut self, k: usize) -> Self {
        self.options.k = Some(k);
        self
    }

    /// Set the minimum similarity score.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.options.similarity_threshold = Some(threshold);
        self
    }

    /// Require `metadata[key] == value`.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.metadata_filter.insert(key.into(), value.into());
        self
    }

    /// Keep only passages on `page`.
    pub fn page(mut self, page: u32) -> Self {
        self.options.page_filter = Some(page);
        self
    }

    /// Build the options, validating ranges.
    pub fn build(self) -> Result<RetrievalOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
