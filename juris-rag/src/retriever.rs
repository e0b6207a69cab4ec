//! Retrieval orchestration: classify, search, filter.
//!
//! Filtering runs in a fixed order (threshold, metadata, page). Each stage
//! only removes passages, so the search order survives to the output.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::RetrievalOptions;
use crate::corpus::CorpusTag;
use crate::document::Passage;
use crate::error::{RagError, Result};
use crate::search::SimilaritySearchClient;
use crate::selector::CorpusSelector;

/// Drop passages scoring below `options.similarity_threshold`.
pub fn filter_by_threshold(passages: Vec<Passage>, options: &RetrievalOptions) -> Vec<Passage> {
    match options.similarity_threshold {
        Some(threshold) => passages.into_iter().filter(|p| p.score >= threshold).collect(),
        None => passages,
    }
}

/// Keep passages whose metadata matches every entry of `options.metadata_filter`.
pub fn filter_by_metadata(passages: Vec<Passage>, options: &RetrievalOptions) -> Vec<Passage> {
    if options.metadata_filter.is_empty() {
        return passages;
    }
    passages
        .into_iter()
        .filter(|p| options.metadata_filter.iter().all(|(k, v)| p.metadata.get(k) == Some(v)))
        .collect()
}

/// Keep passages on `options.page_filter`.
pub fn filter_by_page(passages: Vec<Passage>, options: &RetrievalOptions) -> Vec<Passage> {
    match options.page_filter {
        Some(page) => passages.into_iter().filter(|p| p.page() == Some(page)).collect(),
        None => passages,
    }
}

/// Apply every post-search filter in order.
pub fn apply_filters(passages: Vec<Passage>, options: &RetrievalOptions) -> Vec<Passage> {
    let passages = filter_by_threshold(passages, options);
    let passages = filter_by_metadata(passages, options);
    filter_by_page(passages, options)
}

/// Retrieves passages for a query from one corpus.
#[async_trait]
pub trait Retriever: Send + Sync {
    fn corpus(&self) -> CorpusTag;

    async fn retrieve(&self, query: &str, options: &RetrievalOptions) -> Result<Vec<Passage>>;
}

/// The single [`Retriever`] implementation, parameterized by corpus.
pub struct CorpusRetriever {
    corpus: CorpusTag,
    search: Arc<SimilaritySearchClient>,
}

impl CorpusRetriever {
    pub fn new(corpus: CorpusTag, search: Arc<SimilaritySearchClient>) -> Self {
        Self { corpus, search }
    }
}

#[async_trait]
impl Retriever for CorpusRetriever {
    fn corpus(&self) -> CorpusTag {
        self.corpus
    }

    async fn retrieve(&self, query: &str, options: &RetrievalOptions) -> Result<Vec<Passage>> {
        options.validate()?;
        let raw = self.search.search(self.corpus, query, options.limit()).await?;
        let raw_count = raw.len();
        let passages = apply_filters(raw, options);
        info!(
            corpus = %self.corpus,
            raw_count,
            result_count = passages.len(),
            "retrieval completed"
        );
        Ok(passages)
    }
}

/// Outcome of [`RetrievalOrchestrator::retrieve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    /// The corpus searched, or `None` when retrieval was skipped.
    pub corpus: Option<CorpusTag>,
    pub passages: Vec<Passage>,
}

/// Composes the [`CorpusSelector`] with per-corpus retrievers.
///
/// A failed or timed-out classification is treated as out-of-domain and
/// retrieval is skipped. Search failures and configuration errors propagate.
pub struct RetrievalOrchestrator {
    selector: CorpusSelector,
    search: Arc<SimilaritySearchClient>,
    classification_timeout: Option<Duration>,
    search_timeout: Option<Duration>,
}

impl RetrievalOrchestrator {
    pub fn new(selector: CorpusSelector, search: Arc<SimilaritySearchClient>) -> Self {
        Self { selector, search, classification_timeout: None, search_timeout: None }
    }

    pub fn with_classification_timeout(mut self, timeout: Duration) -> Self {
        self.classification_timeout = Some(timeout);
        self
    }

    /// Budget for embedding plus similarity search.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = Some(timeout);
        self
    }

    pub fn search_client(&self) -> &Arc<SimilaritySearchClient> {
        &self.search
    }

    pub fn retriever(&self, corpus: CorpusTag) -> CorpusRetriever {
        CorpusRetriever::new(corpus, self.search.clone())
    }

    /// Classify `query`; failures and timeouts resolve to `None`.
    pub async fn select(&self, query: &str) -> Option<CorpusTag> {
        let outcome = match self.classification_timeout {
            Some(limit) => tokio::time::timeout(limit, self.selector.classify(query))
                .await
                .unwrap_or(Err(RagError::Timeout("classification"))),
            None => self.selector.classify(query).await,
        };
        match outcome {
            Ok(tag) => tag,
            Err(e) => {
                warn!(error = %e, "classification failed, skipping retrieval");
                None
            }
        }
    }

    /// Classify, then search and filter the selected corpus.
    #[instrument(skip_all)]
    pub async fn retrieve(&self, query: &str, options: &RetrievalOptions) -> Result<Retrieval> {
        let Some(corpus) = self.select(query).await else {
            info!("query out of domain, retrieval skipped");
            return Ok(Retrieval::default());
        };

        let retriever = self.retriever(corpus);
        let passages = match self.search_timeout {
            Some(limit) => tokio::time::timeout(limit, retriever.retrieve(query, options))
                .await
                .map_err(|_| RagError::Timeout("similarity search"))??,
            None => retriever.retrieve(query, options).await?,
        };

        Ok(Retrieval { corpus: Some(corpus), passages })
    }
}
