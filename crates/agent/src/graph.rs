//! Graph execution: reasoning node, tool node, and the fixed-point loop

use std::sync::Arc;

use tracing::{debug, warn};

use dbchat_mcp::ToolExecutor;
use dbchat_provider::{ChatParams, Message, Provider, ToolCallDef, ToolChoice};
use dbchat_session::CheckpointStore;

use crate::state::{extract_response, route, AgentState, Next};
use crate::{prompt, AgentError, Result};

/// Default bound on reasoning/tool rounds within one user turn.
pub const DEFAULT_MAX_ROUNDS: u32 = 8;

/// The compiled agent: provider, tool executor, and checkpoint store
/// wired into the two-node graph.
pub struct Agent<P: Provider> {
    provider: Arc<P>,
    tools: Arc<dyn ToolExecutor>,
    store: Arc<dyn CheckpointStore>,
    model: String,
    temperature: f32,
    system_prompt: String,
    max_rounds: u32,
}

impl<P: Provider> Agent<P> {
    pub fn new(
        provider: P,
        tools: Arc<dyn ToolExecutor>,
        store: Arc<dyn CheckpointStore>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            tools,
            store,
            model: model.into(),
            temperature,
            system_prompt: prompt::system_prompt().to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Replace the default system instruction.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Bound the reasoning/tool cycle per turn.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Run one user turn: load history for the thread, append the user
    /// message, run the graph to its fixed point, checkpoint, and return
    /// the extracted response.
    pub async fn run_turn(&self, thread_id: &str, input: &str) -> Result<String> {
        let history = self.store.get(thread_id).await.unwrap_or_default();
        let mut state = AgentState::from_messages(history);
        state.push(Message::user(input));

        let outcome = self.run_graph(&mut state).await;

        // Checkpoint whatever was accumulated, even on error, so the
        // next turn sees the user message and any tool results.
        self.store.put(thread_id, state.messages.clone()).await;

        outcome?;
        Ok(extract_response(&state.messages))
    }

    /// REASON → ROUTE → {TOOLS → REASON | DONE}
    async fn run_graph(&self, state: &mut AgentState) -> Result<()> {
        let mut round = 0;

        loop {
            round += 1;
            if round > self.max_rounds {
                warn!("Turn exceeded {} reasoning rounds", self.max_rounds);
                return Err(AgentError::MaxRounds(self.max_rounds));
            }

            debug!("Reasoning round {}", round);
            self.reason(state).await?;

            match route(state) {
                Next::Done => return Ok(()),
                Next::Tools => self.execute_tools(state).await,
            }
        }
    }

    /// Reasoning node: one inference call, one assistant message appended.
    ///
    /// The system instruction is prepended to the outgoing request only;
    /// the persisted conversation never contains it.
    async fn reason(&self, state: &mut AgentState) -> Result<()> {
        let needs_system = state
            .messages
            .first()
            .map_or(true, |m| m.role != "system");

        let mut messages = Vec::with_capacity(state.len() + 1);
        if needs_system {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.extend(state.messages.iter().cloned());

        let params = ChatParams {
            model: self.model.clone(),
            messages,
            tools: self.tools.definitions(),
            temperature: self.temperature,
            tool_choice: ToolChoice::Auto,
            ..ChatParams::default()
        };

        let response = self
            .provider
            .chat(params)
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        let mut reply = Message::assistant(response.content.clone().unwrap_or_default());
        if response.has_tool_calls() {
            reply.tool_calls = Some(
                response
                    .tool_calls
                    .iter()
                    .map(|tc| ToolCallDef::new(&tc.id, &tc.name, tc.arguments.clone()))
                    .collect(),
            );
        }
        state.push(reply);
        Ok(())
    }

    /// Tool node: one result message per request, in request order.
    ///
    /// A failing call becomes an error-content result for that request;
    /// the remaining requests still execute.
    async fn execute_tools(&self, state: &mut AgentState) {
        let pending: Vec<ToolCallDef> = state
            .last()
            .and_then(|m| m.tool_calls.clone())
            .unwrap_or_default();

        for call in pending {
            debug!("Executing tool {}", call.function.name);
            let result = match self
                .tools
                .call(&call.function.name, &call.function.arguments)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("Tool {} failed: {}", call.function.name, e);
                    format!("Error: {}", e)
                }
            };
            state.push(Message::tool(&call.id, &call.function.name, result));
        }
    }
}
