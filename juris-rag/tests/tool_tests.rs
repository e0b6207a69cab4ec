mod common;

use common::{row, search_client};
use juris_core::{JurisError, Tool};
use juris_rag::SectionLookupTool;
use serde_json::json;

async fn tool() -> SectionLookupTool {
    let search = search_client(vec![
        row("s362", vec![1.0, 0.0, 0.0], &[("section", "362"), ("page", "40")]),
        row("s365", vec![0.8, 0.6, 0.0], &[("section", "365")]),
        row("a12", vec![0.0, 1.0, 0.0], &[("article", "12")]),
    ])
    .await;
    SectionLookupTool::new(search)
}

#[tokio::test]
async fn declaration_lists_every_corpus() {
    let declaration = tool().await.declaration();

    assert_eq!(declaration.name, "lookup_section");
    let schema = declaration.parameters.unwrap();
    let corpora = schema["properties"]["corpus"]["enum"].as_array().unwrap();
    assert_eq!(corpora.len(), 4);
    assert!(corpora.contains(&json!("criminal_procedure")));
    assert_eq!(schema["required"], json!(["corpus", "section"]));
}

#[tokio::test]
async fn finds_section_by_number() {
    let args = json!({ "corpus": "criminal", "section": "362" });
    let result = tool().await.execute(args).await.unwrap();

    assert_eq!(result["corpus"], "criminal");
    assert_eq!(result["section"], "362");
    let matches = result["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["content"], "content of s362");
    assert_eq!(matches[0]["metadata"]["page"], "40");
}

#[tokio::test]
async fn accepts_numeric_section_and_falls_back_to_article() {
    let args = json!({ "corpus": "criminal", "section": 12 });
    let result = tool().await.execute(args).await.unwrap();

    let matches = result["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["content"], "content of a12");
}

#[tokio::test]
async fn unknown_section_returns_no_matches() {
    let result = tool().await.execute(json!({ "corpus": "civil", "section": "1" })).await.unwrap();
    assert!(result["matches"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bad_arguments_are_tool_errors() {
    let tool = tool().await;

    for args in [
        json!({ "section": "362" }),
        json!({ "corpus": "tax", "section": "1" }),
        json!({ "corpus": "criminal" }),
        json!({ "corpus": "criminal", "section": true }),
    ] {
        let err = tool.execute(args.clone()).await.unwrap_err();
        assert!(matches!(err, JurisError::Tool(_)), "{args}");
    }
}
