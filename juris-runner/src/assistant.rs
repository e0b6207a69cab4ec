//! The request pipeline.
//!
//! ```text
//! Received ─► Corrected? ─► Classified ─► Retrieved ─► Assembled ─► Generated
//!                                                                    │
//!                                              Persisted (user id) ◄─┴─► Cached in memory
//! ```
//!
//! History is written only once generation has succeeded, so a failed or
//! timed-out stage leaves stored conversations untouched.

use std::sync::Arc;

use juris_core::{Content, Llm, Role, Tool};
use juris_rag::{CorpusSelector, Retrieval, RetrievalOrchestrator, SimilaritySearchClient};
use juris_session::{
    ChatStore, ConversationStore, InMemoryConversationStore, SessionError, chat_title,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::assembler::ConversationAssembler;
use crate::config::AssistantConfig;
use crate::corrector::Corrector;
use crate::error::{Result, RunnerError};
use crate::generation::GenerationClient;

/// One question to the assistant.
///
/// With a `user_id` the conversation id names a persisted chat owned by that
/// user. Without one, history lives in the [`ConversationStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub text: String,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AskRequest {
    pub fn new(text: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self { text: text.into(), conversation_id: conversation_id.into(), user_id: None }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Answers legal questions: corrects, classifies, retrieves, assembles and
/// generates, then records the exchange.
///
/// Construct one via [`LegalAssistant::builder()`].
pub struct LegalAssistant {
    config: AssistantConfig,
    corrector: Option<Corrector>,
    orchestrator: RetrievalOrchestrator,
    assembler: ConversationAssembler,
    generator: GenerationClient,
    conversations: Arc<dyn ConversationStore>,
    chats: Option<Arc<dyn ChatStore>>,
}

impl LegalAssistant {
    pub fn builder() -> LegalAssistantBuilder {
        LegalAssistantBuilder::default()
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn conversations(&self) -> &Arc<dyn ConversationStore> {
        &self.conversations
    }

    /// Answer `request.text` in the context of its conversation.
    ///
    /// # Errors
    ///
    /// Any failure after classification fails the request. Classification
    /// failures only skip retrieval. A `conversation_id` naming another
    /// user's chat fails with [`SessionError::ChatExists`] before any model
    /// call.
    #[instrument(
        skip_all,
        fields(conversation.id = %request.conversation_id, persisted = request.user_id.is_some())
    )]
    pub async fn ask(&self, request: AskRequest) -> Result<String> {
        if request.text.trim().is_empty() {
            return Err(RunnerError::InvalidRequest("text must not be empty".into()));
        }
        if request.conversation_id.trim().is_empty() {
            return Err(RunnerError::InvalidRequest("conversation id must not be empty".into()));
        }

        let history = self.load_history(&request).await?;

        let text = match &self.corrector {
            Some(corrector) => corrector.correct(&request.text).await,
            None => request.text.clone(),
        };

        let retrieval = if self.config.classify {
            self.orchestrator.retrieve(&text, &self.config.retrieval).await.map_err(|e| {
                error!(error = %e, "retrieval failed");
                RunnerError::from(e)
            })?
        } else {
            Retrieval::default()
        };

        let llm_request = self.assembler.assemble(&retrieval.passages, &history, &text);
        let reply = self.generator.generate(llm_request).await?;

        self.record(&request, &text, &reply).await?;
        info!(
            corpus = ?retrieval.corpus,
            passage_count = retrieval.passages.len(),
            history_len = history.len(),
            "answered"
        );
        Ok(reply)
    }

    async fn load_history(&self, request: &AskRequest) -> Result<Vec<Content>> {
        let Some(user_id) = &request.user_id else {
            return Ok(self.conversations.get(&request.conversation_id).await?);
        };
        let chats = self.chat_store()?;
        if chats.is_owned_by_other(&request.conversation_id, user_id).await? {
            let chat_id = request.conversation_id.clone();
            return Err(SessionError::ChatExists { chat_id }.into());
        }
        if chats.get_chat(&request.conversation_id, user_id).await?.is_none() {
            return Ok(Vec::new());
        }
        let messages = chats.list_messages(&request.conversation_id, user_id).await?;
        Ok(messages.iter().map(|m| m.to_content()).collect())
    }

    async fn record(&self, request: &AskRequest, text: &str, reply: &str) -> Result<()> {
        let Some(user_id) = &request.user_id else {
            self.conversations
                .append(&request.conversation_id, vec![Content::user(text), Content::model(reply)])
                .await?;
            return Ok(());
        };

        let chats = self.chat_store()?;
        let chat_id = &request.conversation_id;
        if chats.get_chat(chat_id, user_id).await?.is_none() {
            chats.create_chat(chat_id, user_id, &chat_title(text)).await?;
        }
        chats.append_messages(chat_id, user_id, &[(Role::User, text), (Role::Model, reply)]).await?;
        Ok(())
    }

    fn chat_store(&self) -> Result<&Arc<dyn ChatStore>> {
        self.chats.as_ref().ok_or_else(|| {
            RunnerError::ConfigError("a user id was given but no chat store is configured".into())
        })
    }
}

/// Builder for [`LegalAssistant`].
///
/// `model` and `search` are required. The classifier and corrector default
/// to the generation model; history defaults to an unbounded
/// [`InMemoryConversationStore`].
///
/// ```rust,ignore
/// let assistant = LegalAssistant::builder()
///     .config(AssistantConfig::default())
///     .model(Arc::new(GeminiModel::new(&api_key, "gemini-2.5-flash")?))
///     .search(search)
///     .tool(Arc::new(SectionLookupTool::new(search.clone())))
///     .build()?;
/// ```
#[derive(Default)]
pub struct LegalAssistantBuilder {
    config: Option<AssistantConfig>,
    model: Option<Arc<dyn Llm>>,
    classifier: Option<Arc<dyn Llm>>,
    search: Option<Arc<SimilaritySearchClient>>,
    tools: Vec<Arc<dyn Tool>>,
    conversations: Option<Arc<dyn ConversationStore>>,
    chats: Option<Arc<dyn ChatStore>>,
}

impl LegalAssistantBuilder {
    pub fn config(mut self, config: AssistantConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn model(mut self, model: Arc<dyn Llm>) -> Self {
        self.model = Some(model);
        self
    }

    /// Use a separate model for classification and correction.
    pub fn classifier(mut self, model: Arc<dyn Llm>) -> Self {
        self.classifier = Some(model);
        self
    }

    pub fn search(mut self, search: Arc<SimilaritySearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = Some(store);
        self
    }

    pub fn chat_store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.chats = Some(store);
        self
    }

    /// # Errors
    ///
    /// Returns [`RunnerError::ConfigError`] if `model` or `search` is missing.
    pub fn build(self) -> Result<LegalAssistant> {
        let config = self.config.unwrap_or_default();
        let model =
            self.model.ok_or_else(|| RunnerError::ConfigError("model is required".into()))?;
        let search =
            self.search.ok_or_else(|| RunnerError::ConfigError("search is required".into()))?;
        let classifier = self.classifier.unwrap_or_else(|| model.clone());
        let timeouts = config.timeouts;

        let corrector = config.correct.then(|| {
            let corrector = Corrector::new(classifier.clone());
            match timeouts.correction {
                Some(limit) => corrector.with_timeout(limit),
                None => corrector,
            }
        });

        let mut orchestrator = RetrievalOrchestrator::new(CorpusSelector::new(classifier), search);
        if let Some(limit) = timeouts.classification {
            orchestrator = orchestrator.with_classification_timeout(limit);
        }
        if let Some(limit) = timeouts.search {
            orchestrator = orchestrator.with_search_timeout(limit);
        }

        let mut generator = GenerationClient::new(model)
            .with_tools(self.tools)
            .with_max_tool_rounds(config.max_tool_rounds);
        if let Some(limit) = timeouts.generation {
            generator = generator.with_timeout(limit);
        }

        Ok(LegalAssistant {
            assembler: ConversationAssembler::new(config.system_instruction.clone()),
            config,
            corrector,
            orchestrator,
            generator,
            conversations: self
                .conversations
                .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new())),
            chats: self.chats,
        })
    }
}
