//! relaychat — streaming chat relay in front of a hosted LLM API.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use relaychat_chat::LLMConfig;
use relaychat_core::RelayConfig;
use relaychat_server::{build_router, AppState};

fn print_help() {
    println!("relaychat — streaming chat relay for OpenAI / Gemini");
    println!();
    println!("Usage: relaychat [command]");
    println!();
    println!("Commands:");
    println!("  (none)    Start the server");
    println!("  help      Show this help message");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY        Key for the OpenAI chat completions backend");
    println!("  GEMINI_API_KEY        Key for the Gemini generative content backend");
    println!("  RELAYCHAT_PROVIDER    auto | openai | gemini (default: auto)");
    println!("  PORT                  Listen port (default: 3000)");
    println!("  RUST_LOG              Log filter (default: info)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'relaychat help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Initialize configuration
    let config = RelayConfig::from_env()?;
    let llm_config = LLMConfig::from_env()?;

    // One HTTP client and provider for the life of the process
    let client = reqwest::Client::new();
    let provider = relaychat_chat::build_provider(&llm_config, client)
        .map_err(|e| anyhow::anyhow!("{}: set OPENAI_API_KEY or GEMINI_API_KEY", e))?;

    let addr = config.socket_addr();
    let state = Arc::new(AppState::new(provider));

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("relaychat listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
