use std::sync::Arc;

use tracing::info_span;
use tracing_subscriber::layer::SubscriberExt;

use crate::memory::{CaptureLayer, SpanStore};

fn with_capture(store: &Arc<SpanStore>, f: impl FnOnce()) {
    let subscriber = tracing_subscriber::registry().with(CaptureLayer::new(store.clone()));
    tracing::subscriber::with_default(subscriber, f);
}

#[test]
fn spans_are_grouped_by_conversation() {
    let store = Arc::new(SpanStore::new());

    with_capture(&store, || {
        let ask = info_span!("ask", conversation.id = "c1", persisted = false);
        let _guard = ask.enter();
        {
            let retrieve = info_span!("retrieve");
            let _inner = retrieve.enter();
            tracing::info!(result_count = 2, "retrieval completed");
        }
        {
            let generate = info_span!("generate", model = "mock");
            let _inner = generate.enter();
        }
    });

    let spans = store.spans("c1");
    let names: Vec<&str> = spans.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["retrieve", "generate", "ask"]);
    assert_eq!(spans[1].fields["model"], "mock");
    assert_eq!(spans[2].fields["persisted"], false);
    assert!(spans.iter().all(|s| s.duration_ms >= 0.0));
}

#[test]
fn spans_without_conversation_are_dropped() {
    let store = Arc::new(SpanStore::new());

    with_capture(&store, || {
        let span = info_span!("startup", corpus_count = 4);
        let _guard = span.enter();
    });

    assert!(store.spans("").is_empty());
    assert!(store.take("startup").is_empty());
}

#[test]
fn recorded_fields_are_captured() {
    let store = Arc::new(SpanStore::new());

    with_capture(&store, || {
        let span = info_span!("ask", conversation.id = "c2", corpus = tracing::field::Empty);
        span.record("corpus", "criminal");
        let _guard = span.enter();
    });

    let spans = store.take("c2");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields["corpus"], "criminal");
    assert!(store.spans("c2").is_empty());
}

#[tokio::test]
async fn second_init_is_an_error() {
    let _ = crate::init_telemetry("first");
    assert!(crate::init_with_json("second").is_err());
}
