//! relaychat-cli — terminal front-end for a relaychat server.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use relaychat_chat::Role;
use relaychat_client::{ChatEvent, ChatSession, RelayClient, SubmitOutcome};

const DEFAULT_RELAY_URL: &str = "http://localhost:3000";
const PROMPT: &str = "> ";

fn print_prompt() {
    print!("{}", PROMPT);
    let _ = std::io::stdout().flush();
}

/// Terminal view: prints streamed assistant text as events arrive.
async fn render(mut events: mpsc::UnboundedReceiver<ChatEvent>) {
    let mut stdout = std::io::stdout();
    while let Some(event) = events.recv().await {
        match event {
            // The terminal already echoed what the user typed.
            ChatEvent::MessageAppended(message) if message.role == Role::User => {}
            ChatEvent::MessageAppended(message) => {
                let _ = write!(stdout, "assistant: {}", message.text);
            }
            ChatEvent::MessageUpdated { fragment, .. } => {
                let _ = write!(stdout, "{}", fragment);
            }
            ChatEvent::InputEnabled(true) => {
                let _ = write!(stdout, "\n{}", PROMPT);
            }
            ChatEvent::InputEnabled(false) => {}
        }
        let _ = stdout.flush();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep the terminal quiet unless asked
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let relay_url = match args.get(1).map(String::as_str) {
        Some("--help" | "-h" | "help") => {
            println!("relaychat-cli — chat with a relaychat server from the terminal");
            println!();
            println!("Usage: relaychat-cli [relay-url]");
            println!();
            println!("  relay-url    Base URL of the relay (default: {})", DEFAULT_RELAY_URL);
            println!();
            println!("Type a message and press Enter. Ctrl-D exits.");
            return Ok(());
        }
        Some(url) => url.to_string(),
        None => DEFAULT_RELAY_URL.to_string(),
    };

    let (session, events) = ChatSession::new(RelayClient::new(&relay_url));
    let view = tokio::spawn(render(events));

    print_prompt();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if session.submit(&line).await == SubmitOutcome::Ignored {
            print_prompt();
        }
    }

    // Closing the session closes the event channel and ends the view.
    drop(session);
    view.await?;
    println!();

    Ok(())
}
