use juris_core::{Content, FunctionCall, LlmResponse, Part, Role};
use serde_json::json;

#[test]
fn part_serializes_in_wire_shape() {
    let content = Content::user("Hello")
        .with_part(Part::FunctionCall(FunctionCall { name: "f".into(), args: json!({"a": 1}) }));

    let value = serde_json::to_value(&content).unwrap();
    assert_eq!(
        value,
        json!({
            "role": "user",
            "parts": [
                {"text": "Hello"},
                {"functionCall": {"name": "f", "args": {"a": 1}}}
            ]
        })
    );
}

#[test]
fn role_parses_legacy_assistant_name() {
    assert_eq!("assistant".parse::<Role>().unwrap(), Role::Model);
    assert_eq!(" USER ".parse::<Role>().unwrap(), Role::User);
    assert!("narrator".parse::<Role>().is_err());
}

#[test]
fn text_joins_only_text_parts() {
    let content = Content::new(Role::Model)
        .with_text("Article 5 ")
        .with_part(Part::FunctionCall(FunctionCall { name: "x".into(), args: json!({}) }))
        .with_text("applies.");

    assert_eq!(content.text(), "Article 5 applies.");
    assert_eq!(content.function_calls().len(), 1);
}

#[test]
fn empty_response_has_empty_text() {
    let response = LlmResponse::default();
    assert_eq!(response.text(), "");
    assert!(response.function_calls().is_empty());
}
