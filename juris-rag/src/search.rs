//! Similarity search against one corpus table.

use std::sync::Arc;

use tracing::{debug, error};

use crate::corpus::{CorpusRegistry, CorpusSpec, CorpusTag};
use crate::document::Passage;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Embeds query text and runs a nearest-neighbour query on the table of the
/// requested corpus.
///
/// The registry records the dimensionality each corpus was ingested with;
/// a query embedding of any other length is a [`RagError::ConfigError`].
pub struct SimilaritySearchClient {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    registry: CorpusRegistry,
}

impl SimilaritySearchClient {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        registry: CorpusRegistry,
    ) -> Self {
        Self { embedder, store, registry }
    }

    pub fn registry(&self) -> &CorpusRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Compare every registered corpus against the embedder and the stored
    /// rows. Intended to run once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] on the first mismatch.
    pub async fn verify(&self) -> Result<()> {
        for spec in self.registry.specs() {
            if spec.dimensions != self.embedder.dimensions() {
                return Err(RagError::ConfigError(format!(
                    "corpus '{}' was ingested with {} dimensions but the embedder produces {}",
                    spec.tag,
                    spec.dimensions,
                    self.embedder.dimensions()
                )));
            }
            if let Some(stored) = self.store.dimensions(&spec.table).await? {
                if stored != spec.dimensions {
                    return Err(RagError::ConfigError(format!(
                        "table '{}' stores {stored}-dimensional embeddings, expected {}",
                        spec.table, spec.dimensions
                    )));
                }
            }
        }
        Ok(())
    }

    /// Embed `query_text` and search the corpus, closest match first.
    pub async fn search(
        &self,
        corpus: CorpusTag,
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<Passage>> {
        let spec = self.registry.get(corpus)?;
        let embedding = self.embedder.embed(query_text).await.map_err(|e| {
            error!(corpus = %corpus, error = %e, "query embedding failed");
            e
        })?;
        self.search_spec(spec, &embedding, limit).await
    }

    /// Search with an embedding computed elsewhere.
    pub async fn search_with_embedding(
        &self,
        corpus: CorpusTag,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Passage>> {
        let spec = self.registry.get(corpus)?;
        self.search_spec(spec, embedding, limit).await
    }

    async fn search_spec(
        &self,
        spec: &CorpusSpec,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Passage>> {
        if embedding.len() != spec.dimensions {
            return Err(RagError::ConfigError(format!(
                "query embedding has {} dimensions but corpus '{}' expects {}",
                embedding.len(),
                spec.tag,
                spec.dimensions
            )));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut passages = self.store.search(&spec.table, embedding, limit).await.map_err(|e| {
            error!(corpus = %spec.tag, table = %spec.table, error = %e, "vector search failed");
            e
        })?;

        // Closest first; stable so ties keep the backend's order.
        passages
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        passages.truncate(limit);

        debug!(corpus = %spec.tag, result_count = passages.len(), limit, "similarity search");
        Ok(passages)
    }
}
