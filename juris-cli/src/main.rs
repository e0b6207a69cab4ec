use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use juris_cli::cli::{Cli, Command};
use juris_cli::{GENERIC_ERROR, console, new_conversation_id, setup};
use juris_runner::AskRequest;
use juris_telemetry::SpanStore;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let spans = Arc::new(SpanStore::new());
    let timings = matches!(cli.command, Command::Ask { timings: true, .. });
    let telemetry = if timings {
        juris_telemetry::init_with_capture("juris", spans.clone())
    } else if cli.options.json_logs {
        juris_telemetry::init_with_json("juris")
    } else {
        juris_telemetry::init_telemetry("juris")
    };
    if let Err(e) = telemetry {
        eprintln!("{e}");
    }

    match run(cli, spans).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "request failed");
            eprintln!("{GENERIC_ERROR}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, spans: Arc<SpanStore>) -> anyhow::Result<()> {
    let assistant = setup::build_assistant(&cli.options).await?;

    match cli.command {
        Command::Ask { text, conversation, timings } => {
            let conversation_id = conversation.conversation_id.unwrap_or_else(new_conversation_id);
            let request = AskRequest {
                text,
                conversation_id: conversation_id.clone(),
                user_id: conversation.user_id,
            };
            let reply = assistant.ask(request).await?;
            println!("{reply}");

            if timings {
                for span in spans.take(&conversation_id) {
                    eprintln!("{:>10.1} ms  {}::{}", span.duration_ms, span.target, span.name);
                }
            }
        }
        Command::Chat { conversation } => {
            let conversation_id = conversation.conversation_id.unwrap_or_else(new_conversation_id);
            console::run_console(&assistant, conversation_id, conversation.user_id).await?;
        }
    }
    Ok(())
}
