//! Path helpers for dbchat's data directory

use std::path::PathBuf;

/// Application data directory (~/.dbchat)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".dbchat"))
        .unwrap_or_else(|| PathBuf::from(".dbchat"))
}

/// Log file directory
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main log file location
pub fn log_path() -> PathBuf {
    logs_dir().join("dbchat.log")
}
