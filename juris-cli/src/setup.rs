//! Wires the assistant from command-line options.

use std::sync::Arc;

use anyhow::{Context, Result};
use juris_core::Llm;
use juris_model::GeminiModel;
use juris_rag::gemini::GeminiEmbeddingProvider;
use juris_rag::pgvector::PgVectorStore;
use juris_rag::{
    CorpusRegistry, CorpusTag, DEFAULT_DIMENSIONS, InMemoryVectorStore, RetrievalOptions,
    SectionLookupTool, SimilaritySearchClient, VectorStore,
};
use juris_runner::{AssistantConfig, LegalAssistant};
use juris_session::database::PgChatStore;
use juris_session::{ChatStore, InMemoryChatStore};
use tracing::{info, warn};

use crate::cli::Options;

pub fn retrieval_options(options: &Options) -> Result<RetrievalOptions> {
    let mut builder = RetrievalOptions::builder().k(options.top_k);
    if let Some(threshold) = options.similarity_threshold {
        builder = builder.similarity_threshold(threshold);
    }
    builder.build().context("invalid retrieval options")
}

pub fn assistant_config(options: &Options) -> Result<AssistantConfig> {
    AssistantConfig::builder()
        .retrieval(retrieval_options(options)?)
        .correct(options.correct)
        .build()
        .context("invalid assistant configuration")
}

/// Build the assistant and check the corpora against the embedder.
pub async fn build_assistant(options: &Options) -> Result<LegalAssistant> {
    let model: Arc<dyn Llm> = Arc::new(
        GeminiModel::new(&options.api_key, &options.model)
            .context("failed to create generation model")?,
    );

    let mut embedder = GeminiEmbeddingProvider::new(&options.api_key)
        .context("failed to create embedding provider")?;
    if options.embedding_dimensions != DEFAULT_DIMENSIONS {
        embedder = embedder.with_output_dimensionality(options.embedding_dimensions);
    }

    let (store, chats): (Arc<dyn VectorStore>, Arc<dyn ChatStore>) = match &options.database_url {
        Some(url) => {
            let store = PgVectorStore::new(url, options.max_connections)
                .await
                .context("failed to connect to the corpus database")?;
            let chats = PgChatStore::new(url, options.max_connections)
                .await
                .context("failed to connect to the chat database")?;
            chats.migrate().await.context("failed to prepare chat tables")?;
            (Arc::new(store), Arc::new(chats))
        }
        None => {
            warn!("DATABASE_URL not set, answering without corpora");
            let store = InMemoryVectorStore::new();
            for tag in CorpusTag::ALL {
                store.create_table(tag.default_table()).await;
            }
            (Arc::new(store), Arc::new(InMemoryChatStore::new()))
        }
    };

    let registry = CorpusRegistry::legal(options.embedding_dimensions)
        .context("invalid corpus registry")?;
    let search = Arc::new(SimilaritySearchClient::new(Arc::new(embedder), store, registry));
    search.verify().await.context("corpus configuration does not match the embedder")?;

    let mut builder = LegalAssistant::builder()
        .config(assistant_config(options)?)
        .model(model)
        .search(search.clone())
        .tool(Arc::new(SectionLookupTool::new(search)))
        .chat_store(chats);
    if let Some(name) = &options.classifier_model {
        let classifier = GeminiModel::new(&options.api_key, name)
            .context("failed to create classifier model")?;
        builder = builder.classifier(Arc::new(classifier));
    }

    info!(model = %options.model, "assistant ready");
    builder.build().context("failed to build assistant")
}
