//! Logging setup: full detail to a file, warnings to the console

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use dbchat_config::{log_path, logs_dir};

/// Install the global subscriber. Everything at info and above goes to
/// `~/.dbchat/logs/dbchat.log`; only warnings and errors reach stderr so
/// the conversation stays readable.
pub fn init() -> anyhow::Result<()> {
    let dir = logs_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path())
        .context("failed to open log file")?;

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .with_filter(file_filter);

    let console_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}
