//! OpenAI Chat Completions adapter.
//!
//! Tool use is native but string-typed: the model's `tool_calls` carry
//! their arguments as a JSON string that has to be re-parsed, and
//! observations go back as one `tool` role message per call. A call whose
//! argument string does not parse as an object is dropped with a warning
//! rather than failing the turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use agora_application::ports::backend::{
    BackendError, CompletionRequest, LlmBackend, ToolCompletionRequest,
};
use agora_domain::session::entities::ChatMessage;
use agora_domain::session::response::{Completion, StopReason, ToolCompletion};
use agora_domain::tool::ToolCall;

use super::{decode_json, post_json, tool_schema};

/// Backend name as registered with the router.
pub const OPENAI: &str = "openai";

/// Connection settings for the Chat Completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Environment variable the API key is read from
    pub api_key_env: String,
    /// Inline API key; takes precedence over the environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Adapter for the OpenAI Chat Completions API.
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    /// Same connection, different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Result<String, BackendError> {
        if let Some(key) = &self.config.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.config.api_key_env).map_err(|_| {
            BackendError::NotAvailable(format!(
                "openai: environment variable {} is not set",
                self.config.api_key_env
            ))
        })
    }

    async fn post(&self, body: &Value) -> Result<Value, BackendError> {
        let auth = format!("Bearer {}", self.api_key()?);
        let headers = [("Authorization", auth.as_str())];
        let payload = post_json(&self.client, OPENAI, &self.endpoint(), &headers, body).await?;
        decode_json(OPENAI, &payload)
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &str {
        OPENAI
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

pub(crate) fn build_text_request(config: &OpenAiConfig, request: &CompletionRequest<'_>) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));

    let mut body = json!({
        "model": config.model,
        "messages": messages,
    });
    apply_sampling(&mut body, request.temperature, request.max_tokens);
    body
}

pub(crate) fn build_tool_request(
    config: &OpenAiConfig,
    request: &ToolCompletionRequest<'_>,
) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    for message in request.messages {
        wire_message(message, &mut messages);
    }

    let mut body = json!({
        "model": config.model,
        "messages": messages,
    });
    apply_sampling(&mut body, request.temperature, request.max_tokens);

    let tools: Vec<Value> = request
        .tools
        .definitions()
        .iter()
        .map(|def| {
            json!({
                "type": "function",
                "function": {
                    "name": def.name,
                    "description": def.description,
                    "parameters": tool_schema(def),
                }
            })
        })
        .collect();
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools);
    }
    body
}

fn apply_sampling(body: &mut Value, temperature: Option<f32>, max_tokens: Option<u32>) {
    if let Some(temperature) = temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
}

fn wire_message(message: &ChatMessage, out: &mut Vec<Value>) {
    match message {
        ChatMessage::User { content } => {
            out.push(json!({"role": "user", "content": content}));
        }
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut entry = json!({
                "role": "assistant",
                "content": content.as_deref().map(Value::from).unwrap_or(Value::Null),
            });
            if !tool_calls.is_empty() {
                let calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|call| {
                        let arguments = serde_json::to_string(&call.arguments)
                            .unwrap_or_else(|_| "{}".to_string());
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {"name": call.name, "arguments": arguments},
                        })
                    })
                    .collect();
                entry["tool_calls"] = Value::Array(calls);
            }
            out.push(entry);
        }
        // One `tool` role message per observation, addressed by call id.
        ChatMessage::ToolResults { results } => {
            for result in results {
                out.push(json!({
                    "role": "tool",
                    "tool_call_id": result.call_id,
                    "content": result.content,
                }));
            }
        }
    }
}

pub(crate) fn parse_tool_response(response: &Value) -> Result<ToolCompletion, BackendError> {
    let choice = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| {
            BackendError::InvalidResponse("openai: no choices in response".to_string())
        })?;
    let message = choice.get("message").ok_or_else(|| {
        BackendError::InvalidResponse("openai: choice without a message".to_string())
    })?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        for call in calls {
            let function = call.get("function");
            let Some(name) = function
                .and_then(|f| f.get("name"))
                .and_then(Value::as_str)
            else {
                warn!("openai: dropping tool call without a function name");
                continue;
            };
            let id = call.get("id").and_then(Value::as_str).unwrap_or_default();
            let arguments = function
                .and_then(|f| f.get("arguments"))
                .and_then(Value::as_str)
                .unwrap_or("{}");
            match serde_json::from_str::<Value>(arguments) {
                Ok(Value::Object(map)) => {
                    tool_calls.push(
                        ToolCall::new(id, name).with_arguments(map.into_iter().collect()),
                    );
                }
                _ => {
                    warn!("openai: dropping call to {} with unparsable arguments", name);
                }
            }
        }
    }

    let stop_reason = match choice.get("finish_reason").and_then(Value::as_str) {
        Some("stop") => StopReason::EndTurn,
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some(other) => StopReason::Other(other.to_string()),
        None if !tool_calls.is_empty() => StopReason::ToolUse,
        None => StopReason::EndTurn,
    };

    let tokens_used = response
        .get("usage")
        .and_then(|u| u.get("total_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    Ok(ToolCompletion {
        content,
        tool_calls,
        stop_reason,
        tokens_used,
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
