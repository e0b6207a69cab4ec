mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use juris_core::{Llm, LlmRequest, LlmResponse, Role};
use juris_model::MockLlm;
use juris_rag::{EmbeddingProvider, RagError};
use juris_runner::{
    AskRequest, AssistantConfig, FALLBACK_RESPONSE, LegalAssistant, RunnerError, StageTimeouts,
};
use juris_session::{
    ChatStore, ConversationStore, InMemoryChatStore, InMemoryConversationStore, SessionError,
};

async fn assistant(llm: Arc<MockLlm>, config: AssistantConfig) -> LegalAssistant {
    LegalAssistant::builder()
        .config(config)
        .model(llm)
        .search(common::search_client().await)
        .build()
        .unwrap()
}

fn roles_and_texts(turns: &[juris_core::Content]) -> Vec<(Role, String)> {
    turns.iter().map(|t| (t.role, t.text())).collect()
}

#[tokio::test]
async fn anonymous_history_is_recorded_in_order() {
    let llm = Arc::new(MockLlm::new("mock").with_text_response("none").with_text_response("Hi"));
    let store = Arc::new(InMemoryConversationStore::new());
    let assistant = LegalAssistant::builder()
        .model(llm)
        .search(common::search_client().await)
        .conversation_store(store.clone())
        .build()
        .unwrap();

    let reply = assistant.ask(AskRequest::new("Hello", "c1")).await.unwrap();
    assert_eq!(reply, "Hi");

    let history = store.get("c1").await.unwrap();
    assert_eq!(
        roles_and_texts(&history),
        vec![(Role::User, "Hello".to_string()), (Role::Model, "Hi".to_string())]
    );
}

#[tokio::test]
async fn prior_turns_are_sent_with_the_next_question() {
    let llm = Arc::new(
        MockLlm::new("mock")
            .with_text_response("none")
            .with_text_response("Hi")
            .with_text_response("none")
            .with_text_response("You said Hello."),
    );
    let assistant = assistant(llm.clone(), AssistantConfig::default()).await;

    assistant.ask(AskRequest::new("Hello", "c1")).await.unwrap();
    assistant.ask(AskRequest::new("What did I say?", "c1")).await.unwrap();

    let generation = &llm.requests()[3];
    assert_eq!(
        roles_and_texts(&generation.contents),
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Model, "Hi".to_string()),
            (Role::User, "What did I say?".to_string()),
        ]
    );
    assert_eq!(assistant.conversations().get("c1").await.unwrap().len(), 4);
}

#[tokio::test]
async fn retrieved_passages_reach_the_model_as_documents() {
    let llm = Arc::new(
        MockLlm::new("mock")
            .with_text_response("criminal")
            .with_text_response("Theft is punishable."),
    );
    let assistant = assistant(llm.clone(), AssistantConfig::default()).await;

    let reply = assistant.ask(AskRequest::new("What is theft?", "c1")).await.unwrap();
    assert_eq!(reply, "Theft is punishable.");

    let generation = &llm.requests()[1];
    assert_eq!(generation.documents.len(), 2);
    assert_eq!(generation.documents[0].text, "Whoever commits theft shall be punished.");
    assert!(generation.system_instruction.as_deref().unwrap().contains("legal assistant"));
}

#[tokio::test]
async fn empty_generation_returns_fallback() {
    let llm = Arc::new(MockLlm::new("mock").with_text_response("none").with_text_response(""));
    let assistant = assistant(llm, AssistantConfig::default()).await;

    let reply = assistant.ask(AskRequest::new("Hello", "c1")).await.unwrap();
    assert_eq!(reply, FALLBACK_RESPONSE);
}

#[tokio::test]
async fn classification_failure_still_answers() {
    let llm = Arc::new(
        MockLlm::new("mock").with_error("classifier unavailable").with_text_response("Hi"),
    );
    let assistant = assistant(llm.clone(), AssistantConfig::default()).await;

    let reply = assistant.ask(AskRequest::new("What is theft?", "c1")).await.unwrap();
    assert_eq!(reply, "Hi");
    assert!(llm.requests()[1].documents.is_empty());
}

#[tokio::test]
async fn generation_failure_leaves_history_unchanged() {
    let llm = Arc::new(MockLlm::new("mock").with_text_response("none").with_error("overloaded"));
    let assistant = assistant(llm, AssistantConfig::default()).await;

    let err = assistant.ask(AskRequest::new("Hello", "c1")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Core(_)));
    assert!(assistant.conversations().get("c1").await.unwrap().is_empty());
}

#[tokio::test]
async fn persisted_chats_bypass_the_conversation_store() {
    let llm = Arc::new(
        MockLlm::new("mock")
            .with_text_response("none")
            .with_text_response("Hi")
            .with_text_response("none")
            .with_text_response("Again"),
    );
    let conversations = Arc::new(InMemoryConversationStore::new());
    let chats = Arc::new(InMemoryChatStore::new());
    let assistant = LegalAssistant::builder()
        .model(llm.clone())
        .search(common::search_client().await)
        .conversation_store(conversations.clone())
        .chat_store(chats.clone())
        .build()
        .unwrap();

    let long = "Hello, I would like to know what the law says about trespass on farmland";
    assistant.ask(AskRequest::new(long, "chat-1").with_user("u1")).await.unwrap();
    assistant.ask(AskRequest::new("And at night?", "chat-1").with_user("u1")).await.unwrap();

    assert!(conversations.is_empty().await);

    let chat = chats.get_chat("chat-1", "u1").await.unwrap().unwrap();
    assert_eq!(chat.title.chars().count(), 50);
    assert!(long.starts_with(&chat.title));

    let messages = chats.list_messages("chat-1", "u1").await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec![long, "Hi", "And at night?", "Again"]);

    // The second generation saw the persisted history.
    assert_eq!(llm.requests()[3].contents.len(), 3);
}

#[tokio::test]
async fn user_id_without_chat_store_is_a_config_error() {
    let llm = Arc::new(MockLlm::new("mock"));
    let assistant = assistant(llm.clone(), AssistantConfig::default()).await;

    let err = assistant.ask(AskRequest::new("Hello", "c1").with_user("u1")).await.unwrap_err();
    assert!(err.is_config());
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn corrected_text_drives_the_pipeline() {
    let llm = Arc::new(
        MockLlm::new("mock")
            .with_text_response("What is theft?")
            .with_text_response("criminal")
            .with_text_response("Theft is..."),
    );
    let config = AssistantConfig::builder().correct(true).build().unwrap();
    let assistant = assistant(llm.clone(), config).await;

    assistant.ask(AskRequest::new("wat is theft", "c1")).await.unwrap();

    let requests = llm.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].contents[0].text(), "wat is theft");
    assert_eq!(requests[1].contents[0].text(), "What is theft?");
    let history = assistant.conversations().get("c1").await.unwrap();
    assert_eq!(history[0].text(), "What is theft?");
}

#[tokio::test]
async fn failed_correction_keeps_original_text() {
    let llm = Arc::new(
        MockLlm::new("mock")
            .with_error("down")
            .with_text_response("none")
            .with_text_response("ok"),
    );
    let config = AssistantConfig::builder().correct(true).build().unwrap();
    let assistant = assistant(llm.clone(), config).await;

    assistant.ask(AskRequest::new("wat is theft", "c1")).await.unwrap();
    assert_eq!(llm.requests()[1].contents[0].text(), "wat is theft");
}

#[tokio::test]
async fn classification_can_be_disabled() {
    let llm = Arc::new(MockLlm::new("mock").with_text_response("General answer."));
    let config = AssistantConfig::builder().classify(false).build().unwrap();
    let assistant = assistant(llm.clone(), config).await;

    let reply = assistant.ask(AskRequest::new("What is theft?", "c1")).await.unwrap();
    assert_eq!(reply, "General answer.");
    assert_eq!(llm.requests().len(), 1);
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let llm = Arc::new(MockLlm::new("mock"));
    let assistant = assistant(llm.clone(), AssistantConfig::default()).await;

    let err = assistant.ask(AskRequest::new("   ", "c1")).await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidRequest(_)));
    assert!(llm.requests().is_empty());
}

struct SlowLlm;

#[async_trait]
impl Llm for SlowLlm {
    fn name(&self) -> &str {
        "slow"
    }

    async fn generate_content(&self, _request: LlmRequest) -> juris_core::Result<LlmResponse> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(LlmResponse::default())
    }
}

#[tokio::test(start_paused = true)]
async fn generation_timeout_fails_without_touching_history() {
    let timeouts =
        StageTimeouts { generation: Some(Duration::from_secs(5)), ..StageTimeouts::none() };
    let assistant = LegalAssistant::builder()
        .config(AssistantConfig::builder().timeouts(timeouts).build().unwrap())
        .model(Arc::new(SlowLlm))
        .classifier(Arc::new(MockLlm::new("mock").with_text_response("none")))
        .search(common::search_client().await)
        .build()
        .unwrap();

    let err = assistant.ask(AskRequest::new("Hello", "c1")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Timeout { stage: "generation" }));
    assert!(assistant.conversations().get("c1").await.unwrap().is_empty());
}

struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> juris_rag::Result<Vec<f32>> {
        Err(RagError::EmbeddingError { provider: "failing".into(), message: "quota".into() })
    }

    fn dimensions(&self) -> usize {
        3
    }
}

struct SlowEmbedder;

#[async_trait]
impl EmbeddingProvider for SlowEmbedder {
    async fn embed(&self, _text: &str) -> juris_rag::Result<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        3
    }
}

#[tokio::test]
async fn search_failure_leaves_history_unchanged() {
    let llm = Arc::new(MockLlm::new("mock").with_text_response("criminal"));
    let store = Arc::new(InMemoryConversationStore::new());
    let assistant = LegalAssistant::builder()
        .model(llm.clone())
        .search(common::search_client_with(Arc::new(FailingEmbedder)).await)
        .conversation_store(store.clone())
        .build()
        .unwrap();

    let err = assistant.ask(AskRequest::new("What is theft?", "c1")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Retrieval(RagError::EmbeddingError { .. })));
    assert!(store.get("c1").await.unwrap().is_empty());
    // Only the classifier ran.
    assert_eq!(llm.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn search_timeout_leaves_history_unchanged() {
    let timeouts = StageTimeouts { search: Some(Duration::from_secs(5)), ..StageTimeouts::none() };
    let llm = Arc::new(MockLlm::new("mock").with_text_response("criminal"));
    let assistant = LegalAssistant::builder()
        .config(AssistantConfig::builder().timeouts(timeouts).build().unwrap())
        .model(llm.clone())
        .search(common::search_client_with(Arc::new(SlowEmbedder)).await)
        .build()
        .unwrap();

    let err = assistant.ask(AskRequest::new("What is theft?", "c1")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Timeout { stage: "similarity search" }));
    assert!(assistant.conversations().get("c1").await.unwrap().is_empty());
    assert_eq!(llm.requests().len(), 1);
}

#[tokio::test]
async fn another_users_chat_is_rejected_before_any_model_call() {
    let llm = Arc::new(MockLlm::new("mock").with_text_response("none").with_text_response("Hi"));
    let chats = Arc::new(InMemoryChatStore::new());
    chats.create_chat("chat-1", "owner", "Private").await.unwrap();
    chats.append_message("chat-1", "owner", Role::User, "Private").await.unwrap();
    let assistant = LegalAssistant::builder()
        .config(AssistantConfig::builder().correct(true).build().unwrap())
        .model(llm.clone())
        .search(common::search_client().await)
        .chat_store(chats.clone())
        .build()
        .unwrap();

    let err = assistant
        .ask(AskRequest::new("Hello", "chat-1").with_user("intruder"))
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::Session(SessionError::ChatExists { .. })));
    assert!(llm.requests().is_empty());
    assert_eq!(chats.list_messages("chat-1", "owner").await.unwrap().len(), 1);
}

#[test]
fn ask_request_wire_shape() {
    let request: AskRequest =
        serde_json::from_str(r#"{"text":"Hello","conversationId":"c1"}"#).unwrap();
    assert_eq!(request, AskRequest::new("Hello", "c1"));

    let request: AskRequest =
        serde_json::from_str(r#"{"text":"Hi","conversationId":"c2","userId":"u1"}"#).unwrap();
    assert_eq!(request.user_id.as_deref(), Some("u1"));
}

#[test]
fn config_builder_validates() {
    assert!(AssistantConfig::builder().system_instruction("  ").build().unwrap_err().is_config());

    let zero = StageTimeouts { search: Some(Duration::ZERO), ..StageTimeouts::default() };
    assert!(AssistantConfig::builder().timeouts(zero).build().is_err());

    let config = AssistantConfig::builder().max_tool_rounds(0).build().unwrap();
    assert_eq!(config.max_tool_rounds, 0);
    assert!(config.classify);
    assert!(!config.correct);
}
