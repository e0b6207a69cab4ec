//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps each corpus table as a `Vec` of rows behind
//! a `tokio::sync::RwLock`. It is suitable for development, tests and small
//! corpora loaded at startup.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{CorpusRow, Passage};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// An in-memory vector store using cosine similarity for search.
///
/// # Example
///
/// ```rust,ignore
/// use juris_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_table("criminal_code_embeddings").await;
/// store.insert("criminal_code_embeddings", rows).await?;
/// let passages = store.search("criminal_code_embeddings", &query, 5).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    tables: RwLock<HashMap<String, Vec<CorpusRow>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table. No-op if it already exists.
    pub async fn create_table(&self, name: &str) {
        self.tables.write().await.entry(name.to_string()).or_default();
    }

    /// Insert rows, replacing any row with the same id.
    pub async fn insert(&self, table: &str, rows: Vec<CorpusRow>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let existing = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        for row in rows {
            match existing.iter_mut().find(|r| r.id == row.id) {
                Some(slot) => *slot = row,
                None => existing.push(row),
            }
        }
        Ok(())
    }
}

fn missing_table(table: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("table '{table}' does not exist"),
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn to_passage(row: &CorpusRow, score: f32) -> Passage {
    Passage {
        id: row.id.clone(),
        content: row.content.clone(),
        score,
        metadata: row.metadata.clone(),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(&self, table: &str, embedding: &[f32], limit: usize) -> Result<Vec<Passage>> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).ok_or_else(|| missing_table(table))?;

        if let Some(row) = rows.iter().find(|r| r.embedding.len() != embedding.len()) {
            return Err(RagError::ConfigError(format!(
                "query embedding has {} dimensions but row '{}' in '{table}' has {}",
                embedding.len(),
                row.id,
                row.embedding.len()
            )));
        }

        let mut scored: Vec<Passage> = rows
            .iter()
            .map(|row| {
                let score = cosine_similarity(&row.embedding, embedding).clamp(0.0, 1.0);
                to_passage(row, score)
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn find_by_metadata(
        &self,
        table: &str,
        key: &str,
        value: &str,
        limit: usize,
    ) -> Result<Vec<Passage>> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(rows
            .iter()
            .filter(|row| row.metadata.get(key).map(String::as_str) == Some(value))
            .take(limit)
            .map(|row| to_passage(row, 1.0))
            .collect())
    }

    async fn dimensions(&self, table: &str) -> Result<Option<usize>> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(rows.first().map(|r| r.embedding.len()))
    }
}
