//! Read-only access to per-corpus embedding tables.

use async_trait::async_trait;

use crate::document::Passage;
use crate::error::Result;

/// A storage backend holding one table of embedded passages per corpus.
///
/// Tables are produced by batch ingestion and only read at query time.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return at most `limit` passages nearest to `embedding`, ordered by
    /// descending similarity. An empty table yields an empty vector.
    async fn search(&self, table: &str, embedding: &[f32], limit: usize) -> Result<Vec<Passage>>;

    /// Return at most `limit` passages whose metadata `key` equals `value`,
    /// with a score of `1.0`.
    async fn find_by_metadata(
        &self,
        table: &str,
        key: &str,
        value: &str,
        limit: usize,
    ) -> Result<Vec<Passage>>;

    /// Embedding length stored in `table`, or `None` when the table is empty.
    async fn dimensions(&self, table: &str) -> Result<Option<usize>>;
}
