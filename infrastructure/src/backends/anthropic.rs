//! Anthropic Messages API adapter.
//!
//! Tool use is native: the model answers with typed content blocks
//! (`text` / `tool_use`) and observations go back as `tool_result` blocks
//! inside a user message. Request building and response parsing are pure
//! functions over `serde_json::Value`, so the protocol mapping is tested
//! without a server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use agora_application::ports::backend::{
    BackendError, CompletionRequest, LlmBackend, ToolCompletionRequest,
};
use agora_domain::session::entities::ChatMessage;
use agora_domain::session::response::{Completion, StopReason, ToolCompletion};
use agora_domain::tool::ToolCall;

use super::{decode_json, object_args, post_json, tool_schema};

/// Backend name as registered with the router.
pub const ANTHROPIC: &str = "anthropic";

/// Connection settings for the Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Environment variable the API key is read from
    pub api_key_env: String,
    /// Inline API key; takes precedence over the environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Output token cap applied when a request does not carry its own
    pub max_tokens: u32,
    /// `anthropic-version` header value
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// Adapter for the Anthropic Messages API.
pub struct AnthropicBackend {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicBackend {
    pub fn new(client: reqwest::Client, config: AnthropicConfig) -> Self {
        Self { client, config }
    }

    /// Same connection, different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn api_key(&self) -> Result<String, BackendError> {
        if let Some(key) = &self.config.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.config.api_key_env).map_err(|_| {
            BackendError::NotAvailable(format!(
                "anthropic: environment variable {} is not set",
                self.config.api_key_env
            ))
        })
    }

    async fn post(&self, body: &Value) -> Result<Value, BackendError> {
        let key = self.api_key()?;
        let headers = [
            ("x-api-key", key.as_str()),
            ("anthropic-version", self.config.api_version.as_str()),
        ];
        let payload =
            post_json(&self.client, ANTHROPIC, &self.endpoint(), &headers, body).await?;
        decode_json(ANTHROPIC, &payload)
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    fn name(&self) -> &str {
        ANTHROPIC
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, BackendError> {
        let body = build_text_request(&self.config, &request);
        let response = self.post(&body).await?;
        parse_text_response(&response)
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest<'_>,
    ) -> Result<ToolCompletion, BackendError> {
        let body = build_tool_request(&self.config, &request);
        let response = self.post(&body).await?;
        parse_tool_response(&response)
    }
}

// ============================================================================
// Wire mapping (pure)
// ============================================================================

pub(crate) fn build_text_request(
    config: &AnthropicConfig,
    request: &CompletionRequest<'_>,
) -> Value {
    let mut body = json!({
        "model": config.model,
        "max_tokens": request.max_tokens.unwrap_or(config.max_tokens),
        "messages": [{"role": "user", "content": request.prompt}],
    });
    if let Some(system) = request.system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

pub(crate) fn build_tool_request(
    config: &AnthropicConfig,
    request: &ToolCompletionRequest<'_>,
) -> Value {
    let mut body = json!({
        "model": config.model,
        "max_tokens": request.max_tokens.unwrap_or(config.max_tokens),
        "messages": wire_messages(request.messages),
    });
    if let Some(system) = request.system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }

    let tools: Vec<Value> = request
        .tools
        .definitions()
        .iter()
        .map(|def| {
            json!({
                "name": def.name,
                "description": def.description,
                "input_schema": tool_schema(def),
            })
        })
        .collect();
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools);
    }
    body
}

fn wire_messages(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message {
            ChatMessage::User { content } => json!({"role": "user", "content": content}),
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut blocks = Vec::new();
                if let Some(text) = content
                    && !text.is_empty()
                {
                    blocks.push(json!({"type": "text", "text": text}));
                }
                for call in tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                json!({"role": "assistant", "content": blocks})
            }
            ChatMessage::ToolResults { results } => {
                let blocks: Vec<Value> = results
                    .iter()
                    .map(|result| {
                        json!({
                            "type": "tool_result",
                            "tool_use_id": result.call_id,
                            "content": result.content,
                            "is_error": result.is_error,
                        })
                    })
                    .collect();
                json!({"role": "user", "content": blocks})
            }
        })
        .collect()
}

pub(crate) fn parse_tool_response(response: &Value) -> Result<ToolCompletion, BackendError> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            BackendError::InvalidResponse("anthropic: missing content array".to_string())
        })?;

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();
    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    text_parts.push(text.to_string());
                }
            }
            Some("tool_use") => {
                let name = block.get("name").and_then(Value::as_str).ok_or_else(|| {
                    BackendError::InvalidResponse(
                        "anthropic: tool_use block without a name".to_string(),
                    )
                })?;
                let id = block.get("id").and_then(Value::as_str).unwrap_or_default();
                let arguments = object_args(block.get("input"));
                tool_calls.push(ToolCall::new(id, name).with_arguments(arguments));
            }
            // Unknown block types (thinking, citations, ...) are skipped.
            _ => {}
        }
    }

    let stop_reason = match response.get("stop_reason").and_then(Value::as_str) {
        Some("end_turn") => StopReason::EndTurn,
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some(other) => StopReason::Other(other.to_string()),
        None if !tool_calls.is_empty() => StopReason::ToolUse,
        None => StopReason::EndTurn,
    };

    let content = if text_parts.is_empty() {
        None
    } else {
        Some(text_parts.join("\n"))
    };
    Ok(ToolCompletion {
        content,
        tool_calls,
        stop_reason,
        tokens_used: usage_tokens(response),
    })
}

pub(crate) fn parse_text_response(response: &Value) -> Result<Completion, BackendError> {
    let completion = parse_tool_response(response)?;
    Ok(Completion {
        content: completion.content.unwrap_or_default(),
        tokens_used: completion.tokens_used,
        finish_reason: completion.stop_reason,
    })
}

fn usage_tokens(response: &Value) -> u32 {
    let usage = response.get("usage");
    let input = usage
        .and_then(|u| u.get("input_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output = usage
        .and_then(|u| u.get("output_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    (input + output) as u32
}
