use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{Id, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Span field that groups captured spans.
pub const CONVERSATION_KEY: &str = "conversation.id";

/// A closed span.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedSpan {
    pub name: String,
    pub target: String,
    pub duration_ms: f64,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Captured spans keyed by conversation id.
///
/// A poisoned lock is not fatal: reads come back empty and new spans are
/// dropped.
#[derive(Debug, Default)]
pub struct SpanStore {
    spans: RwLock<HashMap<String, Vec<CapturedSpan>>>,
}

impl SpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans of a conversation, in the order they closed.
    pub fn spans(&self, conversation_id: &str) -> Vec<CapturedSpan> {
        self.spans
            .read()
            .ok()
            .and_then(|spans| spans.get(conversation_id).cloned())
            .unwrap_or_default()
    }

    /// Remove and return the spans of a conversation.
    pub fn take(&self, conversation_id: &str) -> Vec<CapturedSpan> {
        self.spans
            .write()
            .ok()
            .and_then(|mut spans| spans.remove(conversation_id))
            .unwrap_or_default()
    }

    fn push(&self, conversation_id: String, span: CapturedSpan) {
        if let Ok(mut spans) = self.spans.write() {
            spans.entry(conversation_id).or_default().push(span);
        }
    }
}

/// A tracing layer that records closed spans into a [`SpanStore`].
///
/// Child spans inherit `conversation.id` from their parent, so every stage
/// under an `ask` span lands in the same bucket. Spans outside any
/// conversation are not kept.
pub struct CaptureLayer {
    store: Arc<SpanStore>,
}

impl CaptureLayer {
    pub fn new(store: Arc<SpanStore>) -> Self {
        Self { store }
    }
}

#[derive(Clone)]
struct SpanFields(HashMap<String, serde_json::Value>);

struct Opened(Instant);

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);
        let mut fields = visitor.0;

        if !fields.contains_key(CONVERSATION_KEY) {
            let inherited = span.parent().and_then(|parent| {
                parent
                    .extensions()
                    .get::<SpanFields>()
                    .and_then(|f| f.0.get(CONVERSATION_KEY).cloned())
            });
            if let Some(value) = inherited {
                fields.insert(CONVERSATION_KEY.to_string(), value);
            }
        }

        let mut extensions = span.extensions_mut();
        extensions.insert(Opened(Instant::now()));
        extensions.insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            let mut visitor = JsonVisitor::default();
            values.record(&mut visitor);
            fields.0.extend(visitor.0);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let extensions = span.extensions();
        let fields = extensions.get::<SpanFields>().map(|f| f.0.clone()).unwrap_or_default();
        let Some(conversation_id) =
            fields.get(CONVERSATION_KEY).and_then(|v| v.as_str()).map(str::to_string)
        else {
            return;
        };
        let duration_ms = extensions
            .get::<Opened>()
            .map(|opened| opened.0.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default();

        let metadata = span.metadata();
        self.store.push(
            conversation_id,
            CapturedSpan {
                name: metadata.name().to_string(),
                target: metadata.target().to_string(),
                duration_ms,
                fields,
            },
        );
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(name: &str) -> CapturedSpan {
        CapturedSpan {
            name: name.to_string(),
            target: "test".to_string(),
            duration_ms: 1.0,
            fields: HashMap::new(),
        }
    }

    #[test]
    fn poisoned_store_drops_spans() {
        let store = Arc::new(SpanStore::new());
        store.push("c1".into(), span("ask"));
        assert_eq!(store.spans("c1").len(), 1);

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.spans.write();
            panic!("poison");
        })
        .join();

        store.push("c1".into(), span("generate"));
        assert!(store.spans("c1").is_empty());
        assert!(store.take("c1").is_empty());
    }
}
