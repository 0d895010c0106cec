//! dbchat - chat with a MySQL database through an AI analyst

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;
mod logging;

/// Conversational MySQL query agent
#[derive(Parser)]
#[command(name = "dbchat")]
#[command(about = "Ask questions, get SQL-backed answers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// One-shot message; omit for the interactive loop
        #[arg(short, long)]
        message: Option<String>,
        /// Conversation thread id
        #[arg(short, long, default_value = "1")]
        thread: String,
    },
    /// List the tools exposed by the MCP server
    Tools,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::Chat { message, thread } => {
            if let Err(e) = commands::chat_command(message, thread).await {
                error!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Tools => {
            if let Err(e) = commands::tools_command().await {
                error!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}
