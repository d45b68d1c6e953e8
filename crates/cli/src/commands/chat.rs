//! `scour chat` — interactive chat with per-session history.

use scour_agent::{ChatAgent, InMemorySessions};
use scour_config::AppConfig;
use scour_core::session::SessionId;
use scour_providers::{build_provider, ProviderMode};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const CHAT_SYSTEM_PROMPT: &str = "You are an internal support chatbot. Answer \
accurately and politely, in at most a few short paragraphs.";

pub async fn run(session: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let mode = ProviderMode::detect(&config);
    if !mode.is_live() {
        println!("[i] OPENAI_API_KEY is not set — replies are simulated.");
    }

    let provider = build_provider(&config);
    let sessions = Arc::new(InMemorySessions::new());
    let chat = ChatAgent::new(
        provider,
        config.agent.model.clone(),
        CHAT_SYSTEM_PROMPT,
        sessions,
    )
    .with_temperature(config.agent.temperature)
    .with_max_tokens(config.agent.max_tokens);

    let session_id = SessionId::new(session);

    println!("=== Scour chat (session: {session_id}) ===");
    println!("Type a question. 'quit' or 'exit' leaves; Ctrl-C also exits cleanly.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!("\nLeaving chat.");
                break;
            }
        };

        let Some(line) = line else {
            // stdin closed
            println!("\nLeaving chat.");
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Leaving chat.");
            break;
        }

        match chat.send(&session_id, input).await {
            Ok(reply) => println!("bot: {reply}\n"),
            Err(e) => eprintln!("error: {e}\n"),
        }
    }

    Ok(())
}
