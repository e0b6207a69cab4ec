//! The legal corpora and the registry mapping each to its embedding table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Embedding dimensionality of `text-embedding-004`, used at ingestion time.
pub const DEFAULT_DIMENSIONS: usize = 768;

/// A legal domain with its own pre-embedded corpus.
///
/// Out-of-domain queries are represented as `Option::<CorpusTag>::None`
/// rather than a sentinel variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusTag {
    Constitution,
    Criminal,
    Civil,
    CriminalProcedure,
}

impl CorpusTag {
    pub const ALL: [CorpusTag; 4] = [
        CorpusTag::Constitution,
        CorpusTag::Criminal,
        CorpusTag::Civil,
        CorpusTag::CriminalProcedure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CorpusTag::Constitution => "constitution",
            CorpusTag::Criminal => "criminal",
            CorpusTag::Civil => "civil",
            CorpusTag::CriminalProcedure => "criminal_procedure",
        }
    }

    /// Default embedding table for this corpus.
    pub fn default_table(&self) -> &'static str {
        match self {
            CorpusTag::Constitution => "constitution_embeddings",
            CorpusTag::Criminal => "criminal_code_embeddings",
            CorpusTag::Civil => "civil_code_embeddings",
            CorpusTag::CriminalProcedure => "criminal_procedure_embeddings",
        }
    }
}

impl fmt::Display for CorpusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorpusTag {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        CorpusTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RagError::ConfigError(format!("unknown corpus '{s}'")))
    }
}

/// Where a corpus lives and how it was embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSpec {
    pub tag: CorpusTag,
    /// Table (or collection) holding one row per passage.
    pub table: String,
    /// Embedding length used when the corpus was ingested.
    pub dimensions: usize,
}

impl CorpusSpec {
    /// Create a spec, rejecting table names that are not plain identifiers.
    pub fn new(tag: CorpusTag, table: impl Into<String>, dimensions: usize) -> Result<Self> {
        let table = table.into();
        if sanitize_table_name(&table)? != table {
            return Err(RagError::ConfigError(format!(
                "table name '{table}' for corpus '{tag}' must contain only alphanumerics and underscores"
            )));
        }
        if dimensions == 0 {
            return Err(RagError::ConfigError(format!(
                "embedding dimensions for corpus '{tag}' must be greater than zero"
            )));
        }
        Ok(Self { tag, table, dimensions })
    }
}

/// Sanitize a name for use as a SQL table identifier.
/// Only allows alphanumeric characters and underscores.
pub fn sanitize_table_name(name: &str) -> Result<String> {
    let sanitized: String =
        name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    if sanitized.is_empty() {
        return Err(RagError::ConfigError("table name is empty after sanitization".to_string()));
    }
    Ok(sanitized)
}

/// Lookup from [`CorpusTag`] to its [`CorpusSpec`].
#[derive(Debug, Clone, Default)]
pub struct CorpusRegistry {
    corpora: HashMap<CorpusTag, CorpusSpec>,
}

impl CorpusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All four legal corpora on their default tables.
    pub fn legal(dimensions: usize) -> Result<Self> {
        CorpusTag::ALL.into_iter().try_fold(Self::new(), |registry, tag| {
            Ok(registry.with(CorpusSpec::new(tag, tag.default_table(), dimensions)?))
        })
    }

    pub fn with(mut self, spec: CorpusSpec) -> Self {
        self.corpora.insert(spec.tag, spec);
        self
    }

    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the corpus is not registered.
    pub fn get(&self, tag: CorpusTag) -> Result<&CorpusSpec> {
        self.corpora
            .get(&tag)
            .ok_or_else(|| RagError::ConfigError(format!("corpus '{tag}' is not registered")))
    }

    pub fn specs(&self) -> impl Iterator<Item = &CorpusSpec> {
        self.corpora.values()
    }
}
