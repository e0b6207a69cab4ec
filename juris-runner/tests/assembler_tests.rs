use std::collections::HashMap;

use juris_core::{Content, Role};
use juris_rag::Passage;
use juris_runner::ConversationAssembler;

fn passage(id: &str, content: &str, section: &str) -> Passage {
    Passage {
        id: id.to_string(),
        content: content.to_string(),
        score: 0.9,
        metadata: HashMap::from([("section".to_string(), section.to_string())]),
    }
}

#[test]
fn new_turn_follows_history() {
    let assembler = ConversationAssembler::new("be precise");
    let history = vec![Content::user("Hello"), Content::model("Hi")];

    let request = assembler.assemble(&[], &history, "What is theft?");

    let turns: Vec<(Role, String)> = request.contents.iter().map(|c| (c.role, c.text())).collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Model, "Hi".to_string()),
            (Role::User, "What is theft?".to_string()),
        ]
    );
    assert_eq!(request.system_instruction.as_deref(), Some("be precise"));
    assert!(request.documents.is_empty());
    assert!(request.tools.is_empty());
}

#[test]
fn passages_become_documents_not_turns() {
    let assembler = ConversationAssembler::new("be precise");
    let passages = vec![passage("a", "Theft is...", "362"), passage("b", "Robbery is...", "365")];

    let request = assembler.assemble(&passages, &[], "What is theft?");

    assert_eq!(request.contents.len(), 1);
    let texts: Vec<&str> = request.documents.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, vec!["Theft is...", "Robbery is..."]);
    assert!(request.contents.iter().all(|c| !c.text().contains("Theft is")));
}
