//! Google Gemini `generateContent` adapter.
//!
//! Tool use is native (`functionCall` / `functionResponse` parts) but
//! Gemini assigns no call ids, so the adapter synthesizes sequential ones
//! (`call_1`, `call_2`, ...) to keep observations addressable. The finish
//! reason stays `STOP` even when the model requests tools, which is why
//! the presence of calls, not the finish reason, decides `ToolUse`.

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

use super::{decode_json, object_args, post_json, tool_schema};

/// Backend name as registered with the router.
pub const GEMINI: &str = "gemini";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model identifier used in the request path
    pub model: String,
    /// Environment variable the API key is read from
    pub api_key_env: String,
    /// Inline API key; takes precedence over the environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Adapter for the Gemini `generateContent` API.
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Same connection, different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<String, BackendError> {
        if let Some(key) = &self.config.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.config.api_key_env).map_err(|_| {
            BackendError::NotAvailable(format!(
                "gemini: environment variable {} is not set",
                self.config.api_key_env
            ))
        })
    }

    async fn post(&self, body: &Value) -> Result<Value, BackendError> {
        let key = self.api_key()?;
        let headers = [("x-goog-api-key", key.as_str())];
        let payload = post_json(&self.client, GEMINI, &self.endpoint(), &headers, body).await?;
        decode_json(GEMINI, &payload)
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn name(&self) -> &str {
        GEMINI
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, BackendError> {
        let body = build_text_request(&request);
        let response = self.post(&body).await?;
        parse_text_response(&response)
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest<'_>,
    ) -> Result<ToolCompletion, BackendError> {
        let body = build_tool_request(&request);
        let response = self.post(&body).await?;
        parse_tool_response(&response)
    }
}

// ============================================================================
// Wire mapping (pure)
// ============================================================================

pub(crate) fn build_text_request(request: &CompletionRequest<'_>) -> Value {
    let mut body = json!({
        "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
    });
    if let Some(system) = request.system {
        body["systemInstruction"] = json!({"parts": [{"text": system}]});
    }
    apply_generation_config(&mut body, request.temperature, request.max_tokens);
    body
}

// The model name rides in the URL, so the body needs no config.
pub(crate) fn build_tool_request(request: &ToolCompletionRequest<'_>) -> Value {
    let mut body = json!({
        "contents": wire_contents(request.messages),
    });
    if let Some(system) = request.system {
        body["systemInstruction"] = json!({"parts": [{"text": system}]});
    }
    apply_generation_config(&mut body, request.temperature, request.max_tokens);

    let declarations: Vec<Value> = request
        .tools
        .definitions()
        .iter()
        .map(|def| {
            json!({
                "name": def.name,
                "description": def.description,
                "parameters": tool_schema(def),
            })
        })
        .collect();
    if !declarations.is_empty() {
        body["tools"] = json!([{"functionDeclarations": declarations}]);
    }
    body
}

fn apply_generation_config(body: &mut Value, temperature: Option<f32>, max_tokens: Option<u32>) {
    let mut config = serde_json::Map::new();
    if let Some(temperature) = temperature {
        config.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = max_tokens {
        config.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }
    if !config.is_empty() {
        body["generationConfig"] = Value::Object(config);
    }
}

fn wire_contents(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message {
            ChatMessage::User { content } => {
                json!({"role": "user", "parts": [{"text": content}]})
            }
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut parts = Vec::new();
                if let Some(text) = content
                    && !text.is_empty()
                {
                    parts.push(json!({"text": text}));
                }
                for call in tool_calls {
                    parts.push(json!({
                        "functionCall": {"name": call.name, "args": call.arguments}
                    }));
                }
                json!({"role": "model", "parts": parts})
            }
            ChatMessage::ToolResults { results } => {
                let parts: Vec<Value> = results
                    .iter()
                    .map(|result| {
                        json!({
                            "functionResponse": {
                                "name": result.tool_name,
                                "response": {"content": result.content},
                            }
                        })
                    })
                    .collect();
                json!({"role": "user", "parts": parts})
            }
        })
        .collect()
}

pub(crate) fn parse_tool_response(response: &Value) -> Result<ToolCompletion, BackendError> {
    let candidate = response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .ok_or_else(|| {
            BackendError::InvalidResponse("gemini: no candidates in response".to_string())
        })?;

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();
    // A safety-blocked candidate has a finishReason but no parts.
    let parts = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array);
    if let Some(parts) = parts {
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                text_parts.push(text.to_string());
            } else if let Some(call) = part.get("functionCall") {
                let Some(name) = call.get("name").and_then(Value::as_str) else {
                    warn!("gemini: dropping functionCall without a name");
                    continue;
                };
                let id = format!("call_{}", tool_calls.len() + 1);
                let arguments = object_args(call.get("args"));
                tool_calls.push(ToolCall::new(id, name).with_arguments(arguments));
            }
        }
    }

    let stop_reason = if !tool_calls.is_empty() {
        StopReason::ToolUse
    } else {
        match candidate.get("finishReason").and_then(Value::as_str) {
            Some("STOP") | None => StopReason::EndTurn,
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            Some(other) => StopReason::Other(other.to_string()),
        }
    };

    let tokens_used = response
        .get("usageMetadata")
        .and_then(|u| u.get("totalTokenCount"))
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    let content = if text_parts.is_empty() {
        None
    } else {
        Some(text_parts.join("\n"))
    };
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
