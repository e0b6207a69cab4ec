use juris_core::{Content, Role};
use juris_session::{ConversationStore, InMemoryConversationStore, LruConversationStore};
use proptest::prelude::*;

fn texts(turns: &[Content]) -> Vec<(Role, String)> {
    turns.iter().map(|t| (t.role, t.text())).collect()
}

#[tokio::test]
async fn history_keeps_turn_order() {
    let store = InMemoryConversationStore::new();
    store.append("c1", vec![Content::user("Hello")]).await.unwrap();
    store.append("c1", vec![Content::model("Hi")]).await.unwrap();

    let history = store.get("c1").await.unwrap();
    assert_eq!(
        texts(&history),
        vec![(Role::User, "Hello".to_string()), (Role::Model, "Hi".to_string())]
    );
}

#[tokio::test]
async fn unknown_conversation_is_empty() {
    let store = InMemoryConversationStore::new();
    assert!(store.get("nope").await.unwrap().is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn conversations_are_isolated() {
    let store = InMemoryConversationStore::new();
    store.append("a", vec![Content::user("one")]).await.unwrap();
    store.append("b", vec![Content::user("two"), Content::model("2")]).await.unwrap();

    assert_eq!(store.get("a").await.unwrap().len(), 1);
    assert_eq!(store.get("b").await.unwrap().len(), 2);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn lru_evicts_least_recently_used() {
    let store = LruConversationStore::new(2);
    store.append("a", vec![Content::user("a")]).await.unwrap();
    store.append("b", vec![Content::user("b")]).await.unwrap();

    // Reading "a" makes "b" the eviction candidate.
    store.get("a").await.unwrap();
    store.append("c", vec![Content::user("c")]).await.unwrap();

    assert_eq!(store.len().await, 2);
    assert_eq!(store.get("a").await.unwrap().len(), 1);
    assert!(store.get("b").await.unwrap().is_empty());
    assert_eq!(store.get("c").await.unwrap().len(), 1);
}

#[tokio::test]
async fn lru_append_to_existing_refreshes_and_extends() {
    let store = LruConversationStore::new(2);
    store.append("a", vec![Content::user("Hello")]).await.unwrap();
    store.append("b", vec![Content::user("b")]).await.unwrap();
    store.append("a", vec![Content::model("Hi")]).await.unwrap();
    store.append("c", vec![Content::user("c")]).await.unwrap();

    let history = store.get("a").await.unwrap();
    assert_eq!(
        texts(&history),
        vec![(Role::User, "Hello".to_string()), (Role::Model, "Hi".to_string())]
    );
    assert!(store.get("b").await.unwrap().is_empty());
}

#[test]
fn zero_capacity_holds_one() {
    assert_eq!(LruConversationStore::new(0).capacity(), 1);
}

proptest! {
    #[test]
    fn lru_never_exceeds_capacity(
        capacity in 1usize..5,
        ids in proptest::collection::vec(0u8..10, 0..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let store = LruConversationStore::new(capacity);
            for id in &ids {
                store.append(&id.to_string(), vec![Content::user("x")]).await.unwrap();
                prop_assert!(store.len().await <= capacity);
            }
            // The most recent conversation always survives.
            if let Some(last) = ids.last() {
                prop_assert!(!store.get(&last.to_string()).await.unwrap().is_empty());
            }
            Ok(())
        })?;
    }
}
