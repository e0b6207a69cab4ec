//! Command-line arguments.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "juris")]
#[command(about = "Ask legal questions answered from the constitution, penal and civil codes")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer one question and exit
    Ask {
        /// The question
        text: String,

        #[command(flatten)]
        conversation: ConversationArgs,

        /// Print per-stage timings to stderr
        #[arg(long)]
        timings: bool,
    },

    /// Interactive session
    Chat {
        #[command(flatten)]
        conversation: ConversationArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ConversationArgs {
    /// Conversation or chat id; a new one is generated when omitted
    #[arg(short, long)]
    pub conversation_id: Option<String>,

    /// Persist the conversation as a chat owned by this user
    #[arg(short, long)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct Options {
    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// PostgreSQL URL of the corpus tables and chat store
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Generation model
    #[arg(long, env = "JURIS_MODEL", default_value = "gemini-2.5-flash")]
    pub model: String,

    /// Model used for classification and correction; defaults to --model
    #[arg(long, env = "JURIS_CLASSIFIER_MODEL")]
    pub classifier_model: Option<String>,

    /// Dimensionality the corpora were embedded with
    #[arg(long, env = "JURIS_EMBEDDING_DIMENSIONS", default_value_t = 768)]
    pub embedding_dimensions: usize,

    /// Passages retrieved per question
    #[arg(long, env = "JURIS_TOP_K", default_value_t = 5)]
    pub top_k: usize,

    /// Drop passages scoring below this value (0 to 1)
    #[arg(long, env = "JURIS_SIMILARITY_THRESHOLD")]
    pub similarity_threshold: Option<f32>,

    /// Fix spelling and grammar before classifying
    #[arg(long)]
    pub correct: bool,

    /// Maximum database connections
    #[arg(long, default_value_t = 10)]
    pub max_connections: u32,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}
