//! Conversation checkpointing keyed by thread id
//!
//! The graph only sees the [`CheckpointStore`] trait, so the in-memory
//! saver can be swapped for a durable backend without touching agent code.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use dbchat_provider::Message;

/// Key-value store for per-thread conversation history.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the saved history for a thread, if any.
    async fn get(&self, thread_id: &str) -> Option<Vec<Message>>;

    /// Replace the saved history for a thread.
    async fn put(&self, thread_id: &str, messages: Vec<Message>);
}

/// In-memory checkpoint store; history lives for the process lifetime.
#[derive(Default)]
pub struct MemorySaver {
    threads: Mutex<HashMap<String, Vec<Message>>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemorySaver {
    async fn get(&self, thread_id: &str) -> Option<Vec<Message>> {
        self.threads.lock().await.get(thread_id).cloned()
    }

    async fn put(&self, thread_id: &str, messages: Vec<Message>) {
        debug!(
            "Checkpointing {} message(s) for thread {}",
            messages.len(),
            thread_id
        );
        self.threads
            .lock()
            .await
            .insert(thread_id.to_string(), messages);
    }
}
