//! Agent graph for the conversational database-query agent
//!
//! A reasoning node and a tool-execution node with one conditional edge
//! between them, run to a fixed point per user turn.

use thiserror::Error;

pub mod graph;
pub mod prompt;
pub mod state;

pub use graph::Agent;
pub use state::{extract_response, route, AgentState, Next, NO_RESPONSE};

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("exceeded {0} reasoning rounds in a single turn")]
    MaxRounds(u32),
}

pub type Result<T> = std::result::Result<T, AgentError>;
