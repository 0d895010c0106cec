//! MCP stdio bridge
//!
//! Spawns the external tool server as a child process, discovers its tools
//! over the Model Context Protocol, and dispatches calls. The transport and
//! protocol are owned by the rmcp SDK; this crate only converts between MCP
//! tool metadata and the provider's [`Tool`] schema.

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, RawContent},
    service::{RoleClient, RunningService},
    transport::TokioChildProcess,
    ServiceExt,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use dbchat_provider::Tool;

/// Default tool server binary, expected on PATH.
pub const DEFAULT_SERVER_COMMAND: &str = "mysql_mcp_server";

/// Bridge errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("failed to start tool server: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("mcp service error: {0}")]
    Service(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("tool reported an error: {0}")]
    ToolFailed(String),
}

pub type Result<T> = std::result::Result<T, McpError>;

/// A source of invocable tools, as consumed by the agent graph.
///
/// The tool set is fixed at construction; only `call` performs I/O.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tool descriptors to advertise to the model.
    fn definitions(&self) -> Vec<Tool>;

    /// Invoke one tool by name. A failing call returns an error without
    /// affecting any other call.
    async fn call(&self, name: &str, arguments: &Value) -> Result<String>;
}

/// Connection to a single MCP server over stdio.
pub struct McpBridge {
    peer: RunningService<RoleClient, ()>,
    tools: Vec<Tool>,
    names: Vec<String>,
}

impl McpBridge {
    /// Spawn the tool server and discover its tools.
    ///
    /// `env` is passed to the child process on top of the inherited
    /// environment; for the MySQL server this carries the `MYSQL_*`
    /// connection parameters.
    pub async fn spawn(command: &str, args: &[String], env: &[(String, String)]) -> Result<Self> {
        info!("Starting MCP tool server: {}", command);

        let mut cmd = Command::new(command);
        cmd.args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let transport = TokioChildProcess::new(cmd)?;
        let peer: RunningService<RoleClient, ()> = ()
            .serve(transport)
            .await
            .map_err(|e| McpError::Service(e.to_string()))?;

        let mcp_tools = peer
            .list_all_tools()
            .await
            .map_err(|e| McpError::Service(e.to_string()))?;

        let tools: Vec<Tool> = mcp_tools.iter().map(convert_tool).collect();
        let names: Vec<String> = tools.iter().map(|t| t.function.name.clone()).collect();
        info!("Discovered {} tool(s): {:?}", names.len(), names);

        Ok(Self { peer, tools, names })
    }

    /// Names of the discovered tools.
    pub fn tool_names(&self) -> &[String] {
        &self.names
    }

    /// Shut down the tool server.
    pub async fn close(self) {
        if let Err(e) = self.peer.cancel().await {
            debug!("MCP shutdown: {}", e);
        }
    }
}

#[async_trait]
impl ToolExecutor for McpBridge {
    fn definitions(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    async fn call(&self, name: &str, arguments: &Value) -> Result<String> {
        if !self.names.iter().any(|n| n == name) {
            return Err(McpError::UnknownTool(name.to_string()));
        }

        debug!("Calling MCP tool {}", name);
        // CallToolRequestParams is non-exhaustive; construct then assign.
        let mut params = CallToolRequestParams::new(name.to_string());
        params.arguments = to_arguments(arguments)?;

        let result = self
            .peer
            .call_tool(params)
            .await
            .map_err(|e| McpError::Service(e.to_string()))?;

        let text = extract_text(&result.content);
        if result.is_error == Some(true) {
            Err(McpError::ToolFailed(text))
        } else {
            Ok(text)
        }
    }
}

/// Convert an MCP tool descriptor to the provider schema.
pub fn convert_tool(mcp_tool: &rmcp::model::Tool) -> Tool {
    let parameters = serde_json::to_value(mcp_tool.input_schema.as_ref())
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}));

    Tool::new(
        mcp_tool.name.as_ref(),
        mcp_tool
            .description
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        parameters,
    )
}

/// Shape a JSON value into the argument map the protocol expects.
fn to_arguments(value: &Value) -> Result<Option<serde_json::Map<String, Value>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map.clone())),
        other => Err(McpError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Join the text items of an MCP tool result.
fn extract_text(content: &[rmcp::model::Content]) -> String {
    content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn tool_conversion_preserves_schema() {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "SQL to execute" }
            },
            "required": ["query"]
        });
        let schema_map: serde_json::Map<String, Value> =
            serde_json::from_value(input_schema).unwrap();

        // Non-exhaustive type; build it up from Default.
        let mut mcp_tool = rmcp::model::Tool::default();
        mcp_tool.name = "execute_sql".into();
        mcp_tool.description = Some("Execute a SQL query against the database".into());
        mcp_tool.input_schema = Arc::new(schema_map);

        let tool = convert_tool(&mcp_tool);
        assert_eq!(tool.function.name, "execute_sql");
        assert_eq!(
            tool.function.description,
            "Execute a SQL query against the database"
        );
        assert_eq!(tool.function.parameters["type"], "object");
        assert!(tool.function.parameters["properties"]["query"].is_object());
    }

    #[test]
    fn tool_conversion_handles_missing_description() {
        let mut mcp_tool = rmcp::model::Tool::default();
        mcp_tool.name = "list_tables".into();
        mcp_tool.input_schema = Arc::new(serde_json::Map::new());

        let tool = convert_tool(&mcp_tool);
        assert_eq!(tool.function.name, "list_tables");
        assert!(tool.function.description.is_empty());
    }

    #[test]
    fn arguments_accept_objects_and_null() {
        let args = to_arguments(&json!({"query": "SELECT 1"})).unwrap();
        assert_eq!(args.unwrap()["query"], "SELECT 1");

        assert!(to_arguments(&Value::Null).unwrap().is_none());
    }

    #[test]
    fn arguments_reject_non_objects() {
        let err = to_arguments(&json!("SELECT 1")).unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(_)));
    }

    #[test]
    fn error_display_names_the_tool() {
        let err = McpError::UnknownTool("drop_tables".into());
        assert_eq!(err.to_string(), "unknown tool: drop_tables");
    }
}
