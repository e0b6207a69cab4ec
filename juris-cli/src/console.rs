//! Interactive chat loop.

use anyhow::Result;
use juris_runner::{AskRequest, LegalAssistant};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

use crate::GENERIC_ERROR;

/// Read questions until EOF or `/quit`, answering each in the same
/// conversation. A failed question prints the generic error and the loop
/// continues.
pub async fn run_console(
    assistant: &LegalAssistant,
    conversation_id: String,
    user_id: Option<String>,
) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Conversation {conversation_id}. Type /quit to leave.\n");

    loop {
        let line = match editor.readline("you > ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/quit" || text == "/exit" {
            break;
        }
        editor.add_history_entry(text)?;

        let request = AskRequest {
            text: text.to_string(),
            conversation_id: conversation_id.clone(),
            user_id: user_id.clone(),
        };
        match assistant.ask(request).await {
            Ok(reply) => println!("\njuris > {reply}\n"),
            Err(e) => {
                error!(error = %e, "question failed");
                eprintln!("\n{GENERIC_ERROR}\n");
            }
        }
    }
    Ok(())
}
