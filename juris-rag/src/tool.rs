//! Structured section lookup exposed to the model as a tool.
//!
//! The model calls it with:
//!
//! ```json
//! { "corpus": "criminal", "section": "362" }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use juris_core::{JurisError, Tool};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::corpus::CorpusTag;
use crate::document::{ARTICLE_KEY, SECTION_KEY};
use crate::search::SimilaritySearchClient;

const MAX_MATCHES: usize = 10;

/// Looks up passages by exact section (or article) number.
pub struct SectionLookupTool {
    search: Arc<SimilaritySearchClient>,
}

impl SectionLookupTool {
    pub fn new(search: Arc<SimilaritySearchClient>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for SectionLookupTool {
    fn name(&self) -> &str {
        "lookup_section"
    }

    fn description(&self) -> &str {
        "Fetch the exact text of a numbered section or article from a legal corpus"
    }

    fn parameters_schema(&self) -> Option<Value> {
        let corpora: Vec<&str> = CorpusTag::ALL.iter().map(CorpusTag::as_str).collect();
        Some(json!({
            "type": "object",
            "properties": {
                "corpus": {
                    "type": "string",
                    "enum": corpora,
                    "description": "The legal corpus containing the section"
                },
                "section": {
                    "type": "string",
                    "description": "The section or article number, e.g. \"362\""
                }
            },
            "required": ["corpus", "section"]
        }))
    }

    async fn execute(&self, args: Value) -> juris_core::Result<Value> {
        let corpus: CorpusTag = args
            .get("corpus")
            .and_then(Value::as_str)
            .ok_or_else(|| JurisError::Tool("missing required 'corpus' parameter".into()))?
            .parse()
            .map_err(|e| JurisError::Tool(format!("{e}")))?;

        // Models sometimes send the number as a JSON number.
        let section = match args.get("section") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(JurisError::Tool("missing required 'section' parameter".into())),
        };

        info!(corpus = %corpus, section = %section, "lookup_section tool called");

        let spec =
            self.search.registry().get(corpus).map_err(|e| JurisError::Tool(e.to_string()))?;
        let store = self.search.store();

        let mut passages = Vec::new();
        for key in [SECTION_KEY, ARTICLE_KEY] {
            passages = store
                .find_by_metadata(&spec.table, key, &section, MAX_MATCHES)
                .await
                .map_err(|e| {
                    error!(error = %e, "lookup_section failed");
                    JurisError::Tool(format!("section lookup failed: {e}"))
                })?;
            if !passages.is_empty() {
                break;
            }
        }

        Ok(json!({
            "corpus": corpus.as_str(),
            "section": section,
            "matches": passages
                .iter()
                .map(|p| json!({ "content": p.content, "metadata": p.metadata }))
                .collect::<Vec<_>>(),
        }))
    }
}
