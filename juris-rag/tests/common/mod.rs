#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use juris_rag::{
    CorpusRegistry, CorpusRow, CorpusSpec, CorpusTag, EmbeddingProvider, InMemoryVectorStore,
    Passage, SimilaritySearchClient,
};

pub const DIM: usize = 3;

/// Embeds every text to the same vector.
pub struct StubEmbedder {
    pub vector: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, _text: &str) -> juris_rag::Result<Vec<f32>> {
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

pub fn row(id: &str, embedding: Vec<f32>, metadata: &[(&str, &str)]) -> CorpusRow {
    CorpusRow {
        id: id.to_string(),
        content: format!("content of {id}"),
        embedding,
        metadata: metadata.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
}

pub fn passage(id: &str, score: f32, metadata: &[(&str, &str)]) -> Passage {
    Passage {
        id: id.to_string(),
        content: format!("content of {id}"),
        score,
        metadata: metadata.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
}

pub fn registry() -> CorpusRegistry {
    CorpusTag::ALL.into_iter().fold(CorpusRegistry::new(), |r, tag| {
        r.with(CorpusSpec::new(tag, tag.default_table(), DIM).unwrap())
    })
}

/// A search client over an in-memory store where the criminal corpus holds
/// `rows` and every other corpus is empty.
pub async fn search_client(rows: Vec<CorpusRow>) -> Arc<SimilaritySearchClient> {
    let store = InMemoryVectorStore::new();
    for tag in CorpusTag::ALL {
        store.create_table(tag.default_table()).await;
    }
    store.insert(CorpusTag::Criminal.default_table(), rows).await.unwrap();

    Arc::new(SimilaritySearchClient::new(
        Arc::new(StubEmbedder { vector: vec![1.0, 0.0, 0.0] }),
        Arc::new(store),
        registry(),
    ))
}

pub fn metadata_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
