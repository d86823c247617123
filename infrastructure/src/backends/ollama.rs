//! Ollama `/api/chat` adapter.
//!
//! Ollama has no native tool-calling, so this adapter runs the text
//! convention end to end: the system prompt is extended with the
//! `TOOL_CALL: name({json})` protocol, responses are split into prose and
//! extracted calls, and observations are folded back into the history as
//! plain `TOOL_RESULT[name]: output` lines. Malformed `TOOL_CALL:` lines
//! drop silently without producing a call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use agora_application::ports::backend::{
    BackendError, CompletionRequest, LlmBackend, ToolCompletionRequest,
};
use agora_domain::debate::parsing::split_text_tool_calls;
use agora_domain::prompt::DebatePrompt;
use agora_domain::session::entities::ChatMessage;
use agora_domain::session::response::{Completion, StopReason, ToolCompletion};
use agora_domain::tool::ToolSpec;

use super::{decode_json, post_json};

/// Backend name as registered with the router.
pub const OLLAMA: &str = "ollama";

/// Connection settings for a local Ollama server. No API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Server base URL
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Adapter for a local Ollama server.
pub struct OllamaBackend {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, config: OllamaConfig) -> Self {
        Self { client, config }
    }

    /// Same connection, different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.config.base_url.trim_end_matches('/'))
    }

    async fn post(&self, body: &Value) -> Result<Value, BackendError> {
        let payload = post_json(&self.client, OLLAMA, &self.endpoint(), &[], body).await?;
        decode_json(OLLAMA, &payload)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &str {
        OLLAMA
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

pub(crate) fn build_text_request(config: &OllamaConfig, request: &CompletionRequest<'_>) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));
    wrap_body(config, messages, request.temperature, request.max_tokens)
}

pub(crate) fn build_tool_request(
    config: &OllamaConfig,
    request: &ToolCompletionRequest<'_>,
) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = tool_system(request.system, request.tools) {
        messages.push(json!({"role": "system", "content": system}));
    }
    for message in request.messages {
        messages.push(wire_message(message));
    }
    wrap_body(config, messages, request.temperature, request.max_tokens)
}

fn wrap_body(
    config: &OllamaConfig,
    messages: Vec<Value>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
) -> Value {
    let mut body = json!({
        "model": config.model,
        "messages": messages,
        "stream": false,
    });
    let mut options = serde_json::Map::new();
    if let Some(temperature) = temperature {
        options.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = max_tokens {
        options.insert("num_predict".to_string(), json!(max_tokens));
    }
    if !options.is_empty() {
        body["options"] = Value::Object(options);
    }
    body
}

/// System prompt with the tool protocol appended when tools are offered.
fn tool_system(system: Option<&str>, tools: &ToolSpec) -> Option<String> {
    if tools.is_empty() {
        return system.map(str::to_string);
    }
    let protocol = DebatePrompt::text_tool_protocol(&tools.definitions());
    match system {
        Some(system) => Some(format!("{system}\n\n{protocol}")),
        None => Some(protocol),
    }
}

/// Render one history entry as a plain-text chat message.
///
/// Assistant tool calls are re-rendered exactly as the protocol line the
/// model originally emitted; observations become `TOOL_RESULT` lines in a
/// user message.
fn wire_message(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::User { content } => json!({"role": "user", "content": content}),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut lines = Vec::new();
            if let Some(text) = content
                && !text.is_empty()
            {
                lines.push(text.clone());
            }
            for call in tool_calls {
                let arguments =
                    serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".to_string());
                lines.push(format!("TOOL_CALL: {}({})", call.name, arguments));
            }
            json!({"role": "assistant", "content": lines.join("\n")})
        }
        ChatMessage::ToolResults { results } => {
            let lines: Vec<String> = results
                .iter()
                .map(|result| format!("TOOL_RESULT[{}]: {}", result.tool_name, result.content))
                .collect();
            json!({"role": "user", "content": lines.join("\n")})
        }
    }
}

pub(crate) fn parse_tool_response(response: &Value) -> Result<ToolCompletion, BackendError> {
    let content = message_content(response)?;
    let (text, tool_calls) = split_text_tool_calls(content);

    let stop_reason = if !tool_calls.is_empty() {
        StopReason::ToolUse
    } else {
        done_reason(response)
    };

    let content = if text.is_empty() { None } else { Some(text) };
    Ok(ToolCompletion {
        content,
        tool_calls,
        stop_reason,
        tokens_used: usage_tokens(response),
    })
}

pub(crate) fn parse_text_response(response: &Value) -> Result<Completion, BackendError> {
    let content = message_content(response)?;
    Ok(Completion {
        content: content.to_string(),
        tokens_used: usage_tokens(response),
        finish_reason: done_reason(response),
    })
}

fn message_content(response: &Value) -> Result<&str, BackendError> {
    response
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            BackendError::InvalidResponse("ollama: response without message content".to_string())
        })
}

fn done_reason(response: &Value) -> StopReason {
    match response.get("done_reason").and_then(Value::as_str) {
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

fn usage_tokens(response: &Value) -> u32 {
    let prompt = response
        .get("prompt_eval_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let eval = response.get("eval_count").and_then(Value::as_u64).unwrap_or(0);
    (prompt + eval) as u32
}
