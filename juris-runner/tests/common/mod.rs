#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use juris_rag::{
    CorpusRegistry, CorpusRow, CorpusSpec, CorpusTag, EmbeddingProvider, InMemoryVectorStore,
    SimilaritySearchClient,
};

pub struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, _text: &str) -> juris_rag::Result<Vec<f32>> {
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        3
    }
}

pub fn row(
    id: &str,
    content: &str,
    embedding: Vec<f32>,
    metadata: &[(&str, &str)],
) -> CorpusRow {
    CorpusRow {
        id: id.to_string(),
        content: content.to_string(),
        embedding,
        metadata: metadata.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
}

/// Criminal code with two sections; every other corpus empty.
pub async fn search_client() -> Arc<SimilaritySearchClient> {
    search_client_with(Arc::new(StubEmbedder)).await
}

pub async fn search_client_with(
    embedder: Arc<dyn EmbeddingProvider>,
) -> Arc<SimilaritySearchClient> {
    let store = InMemoryVectorStore::new();
    let mut registry = CorpusRegistry::new();
    for tag in CorpusTag::ALL {
        store.create_table(tag.default_table()).await;
        registry = registry.with(CorpusSpec::new(tag, tag.default_table(), 3).unwrap());
    }
    store
        .insert(
            CorpusTag::Criminal.default_table(),
            vec![
                row(
                    "s362",
                    "Whoever commits theft shall be punished.",
                    vec![1.0, 0.0, 0.0],
                    &[("section", "362"), ("page", "40")],
                ),
                row(
                    "s415",
                    "Cheating is an offence.",
                    vec![0.0, 1.0, 0.0],
                    &[("section", "415"), ("page", "50")],
                ),
            ],
        )
        .await
        .unwrap();

    Arc::new(SimilaritySearchClient::new(embedder, Arc::new(store), registry))
}
