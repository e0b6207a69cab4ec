//! Corpus rows and retrieved passages.

use std::collections::HashMap;

use juris_core::ContextDocument;
use serde::{Deserialize, Serialize};

/// Metadata key holding the page number of a passage.
pub const PAGE_KEY: &str = "page";
/// Metadata key holding the section (or clause) identifier.
pub const SECTION_KEY: &str = "section";
/// Metadata key holding the article identifier.
pub const ARTICLE_KEY: &str = "article";

/// One ingested row of a corpus table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusRow {
    /// Unique identifier for the row.
    pub id: String,
    /// The passage text.
    pub content: String,
    /// The embedding computed at ingestion time.
    pub embedding: Vec<f32>,
    /// Page number, article/clause identifiers, tags.
    pub metadata: HashMap<String, String>,
}

/// A passage returned by a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    pub id: String,
    pub content: String,
    /// Similarity to the query in `[0, 1]`; higher is closer.
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

impl Passage {
    /// Page number from metadata, if present and numeric.
    pub fn page(&self) -> Option<u32> {
        self.metadata.get(PAGE_KEY).and_then(|p| p.trim().parse().ok())
    }

    /// A short human label built from article/section/page metadata.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.metadata.get(ARTICLE_KEY).map(|a| format!("Article {a}")),
            self.metadata.get(SECTION_KEY).map(|s| format!("Section {s}")),
            self.page().map(|p| format!("page {p}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

impl From<&Passage> for ContextDocument {
    fn from(passage: &Passage) -> Self {
        ContextDocument { title: passage.label(), text: passage.content.clone() }
    }
}
