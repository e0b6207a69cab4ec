//! # juris-cli
//!
//! The `juris` binary: `ask` answers one question, `chat` opens a REPL.
//! Configuration comes from flags or their environment variables
//! (`GOOGLE_API_KEY`, `DATABASE_URL`, `JURIS_MODEL`, ...).

pub mod cli;
pub mod console;
pub mod setup;

/// The only failure text users see.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// A fresh conversation id.
pub fn new_conversation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
