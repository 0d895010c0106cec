//! Command implementations for the dbchat CLI

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info};

use dbchat_agent::Agent;
use dbchat_config::{DbConfig, LlmConfig};
use dbchat_mcp::{McpBridge, ToolExecutor, DEFAULT_SERVER_COMMAND};
use dbchat_provider::OpenAiProvider;
use dbchat_session::MemorySaver;

/// Words that end the interactive loop.
const EXIT_KEYWORDS: &[&str] = &["quit", "exit", "bye", "stop"];

fn is_exit_command(input: &str) -> bool {
    let trimmed = input.trim();
    EXIT_KEYWORDS
        .iter()
        .any(|k| trimmed.eq_ignore_ascii_case(k))
}

/// Spawn the MySQL MCP server with the connection parameters in its
/// environment and verify it advertises at least one tool.
async fn connect_tools(db: &DbConfig) -> Result<McpBridge> {
    let bridge = McpBridge::spawn(DEFAULT_SERVER_COMMAND, &[], &db.to_env_map())
        .await
        .with_context(|| format!("failed to connect to {}", DEFAULT_SERVER_COMMAND))?;

    if bridge.tool_names().is_empty() {
        bail!("tool server exposed no tools");
    }
    Ok(bridge)
}

pub async fn chat_command(message: Option<String>, thread: String) -> Result<()> {
    let db = DbConfig::from_env().context("database configuration error")?;
    let llm = LlmConfig::from_env().context("provider configuration error")?;
    info!("Session starting against {}", db.redacted_url());

    let bridge = connect_tools(&db).await?;
    let provider = OpenAiProvider::new(llm.api_key, llm.api_base, Some(llm.model.clone()));

    let agent = Agent::new(
        provider,
        Arc::new(bridge),
        Arc::new(MemorySaver::new()),
        llm.model,
        llm.temperature,
    );

    if let Some(message) = message {
        let response = run_turn_inline(&agent, &thread, &message).await;
        println!("{}", response);
        return Ok(());
    }

    println!("{}", "=".repeat(60));
    println!("AI Agent Ready! Type quit, exit, bye or stop to stop.");
    println!("{}", "=".repeat(60));

    let mut stdin = BufReader::new(tokio::io::stdin());
    loop {
        print!("\nUSER: ");
        io::stdout().flush()?;

        let mut line = String::new();
        // Ctrl-C ends the session like an exit keyword does.
        let bytes = tokio::select! {
            read = stdin.read_line(&mut line) => read?,
            _ = signal::ctrl_c() => {
                println!("\nExiting...");
                break;
            }
        };
        if bytes == 0 {
            println!("\nExiting...");
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            println!("Exiting...");
            break;
        }

        info!("User query: {}", input);
        let response = run_turn_inline(&agent, &thread, input).await;
        info!("Agent response: {}", response);
        println!("\n{}", response);
    }

    Ok(())
}

/// One turn of the conversation. Failures are reported inline so the
/// loop keeps running.
async fn run_turn_inline<P: dbchat_provider::Provider>(
    agent: &Agent<P>,
    thread: &str,
    input: &str,
) -> String {
    match agent.run_turn(thread, input).await {
        Ok(response) => response,
        Err(e) => {
            error!("Turn failed: {}", e);
            format!("Error during execution: {}", e)
        }
    }
}

/// Connect to the tool server and list what it offers.
pub async fn tools_command() -> Result<()> {
    let db = DbConfig::from_env().context("database configuration error")?;
    let bridge = connect_tools(&db).await?;

    for tool in bridge.definitions() {
        println!("{} - {}", tool.function.name, tool.function.description);
    }

    bridge.close().await;
    Ok(())
}
