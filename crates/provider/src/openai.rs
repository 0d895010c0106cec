//! OpenAI-compatible chat-completions client

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";

/// Client for any `/chat/completions` endpoint speaking the OpenAI shape.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            default_model: default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| {
                let mut obj = json!({ "role": &m.role });
                if let Some(content) = &m.content {
                    obj["content"] = json!(content);
                }
                if let Some(tool_calls) = &m.tool_calls {
                    obj["tool_calls"] = json!(tool_calls);
                }
                if let Some(tool_call_id) = &m.tool_call_id {
                    obj["tool_call_id"] = json!(tool_call_id);
                }
                if let Some(name) = &m.name {
                    obj["name"] = json!(name);
                }
                obj
            })
            .collect();

        let mut body = json!({
            "model": params.model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if !params.tools.is_empty() {
            body["tools"] = json!(params.tools);
            body["tool_choice"] = match &params.tool_choice {
                ToolChoice::Auto => json!("auto"),
                ToolChoice::Required(name) => {
                    json!({"type": "function", "function": {"name": name}})
                }
                ToolChoice::None => json!("none"),
            };
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let message = &choice["message"];
        let content = message["content"].as_str().map(|s| s.to_string());
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let function = &call["function"];
                // Arguments arrive as a JSON-encoded string; fall back to
                // the raw value for servers that inline them.
                let args = function["arguments"]
                    .as_str()
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_else(|| function["arguments"].clone());

                tool_calls.push(ToolCall {
                    id: call["id"].as_str().unwrap_or("").to_string(),
                    name: function["name"].as_str().unwrap_or("").to_string(),
                    arguments: args,
                });
            }
        }

        let usage = if let Some(usage) = json["usage"].as_object() {
            Usage {
                prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage["total_tokens"].as_u64().unwrap_or(0) as u32,
            }
        } else {
            Usage::default()
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        trace!("Calling {}/chat/completions", self.api_base);

        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request(&params);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api(error));
        }

        debug!(
            "Model replied with {} tool call(s)",
            json["choices"][0]["message"]["tool_calls"]
                .as_array()
                .map(|v| v.len())
                .unwrap_or(0)
        );

        self.parse_response(json)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("sk-test", None, None)
    }

    #[test]
    fn defaults_applied_when_unset() {
        let p = provider();
        assert_eq!(p.api_base, "https://api.openai.com/v1");
        assert_eq!(p.default_model(), "gpt-4");
        assert!(p.is_configured());
    }

    #[test]
    fn custom_base_and_model() {
        let p = OpenAiProvider::new(
            "sk-test",
            Some("http://localhost:8000/v1".to_string()),
            Some("gpt-4o".to_string()),
        );
        assert_eq!(p.api_base, "http://localhost:8000/v1");
        assert_eq!(p.default_model(), "gpt-4o");
    }

    #[test]
    fn empty_key_is_not_configured() {
        let p = OpenAiProvider::new("", None, None);
        assert!(!p.is_configured());
    }

    #[test]
    fn build_request_without_tools() {
        let params = ChatParams {
            model: "gpt-4".to_string(),
            messages: vec![Message::system("instructions"), Message::user("hello")],
            ..ChatParams::default()
        };

        let body = provider().build_request(&params);
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 4096);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
    }

    #[test]
    fn build_request_with_tools_sets_auto_choice() {
        let params = ChatParams {
            model: "gpt-4".to_string(),
            messages: vec![Message::user("count churned clients")],
            tools: vec![Tool::new(
                "execute_sql",
                "Run a SQL query",
                json!({"type": "object"}),
            )],
            ..ChatParams::default()
        };

        let body = provider().build_request(&params);
        assert_eq!(body["tool_choice"], "auto");
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools[0]["function"]["name"], "execute_sql");
    }

    #[test]
    fn build_request_serializes_tool_result_messages() {
        let params = ChatParams {
            model: "gpt-4".to_string(),
            messages: vec![Message::tool("call_1", "execute_sql", "| churn |\n| 42 |")],
            ..ChatParams::default()
        };

        let body = provider().build_request(&params);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages[0]["role"], "tool");
        assert_eq!(messages[0]["tool_call_id"], "call_1");
        assert_eq!(messages[0]["name"], "execute_sql");
    }

    #[test]
    fn parse_response_plain_text() {
        let payload = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "42 clients churned."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 6, "total_tokens": 16}
        });

        let response = provider().parse_response(payload).unwrap();
        assert_eq!(response.content.as_deref(), Some("42 clients churned."));
        assert!(!response.has_tool_calls());
        assert_eq!(response.usage.total_tokens, 16);
    }

    #[test]
    fn parse_response_decodes_string_arguments() {
        let payload = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "execute_sql",
                            "arguments": "{\"query\": \"SELECT COUNT(*) FROM client_data WHERE churn = 1\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });

        let response = provider().parse_response(payload).unwrap();
        assert!(response.has_tool_calls());
        assert_eq!(response.tool_calls[0].name, "execute_sql");
        assert_eq!(
            response.tool_calls[0].arguments["query"],
            "SELECT COUNT(*) FROM client_data WHERE churn = 1"
        );
        assert_eq!(response.finish_reason, "tool_calls");
    }

    #[test]
    fn parse_response_without_choices_is_invalid() {
        let result = provider().parse_response(json!({"choices": []}));
        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }
}
