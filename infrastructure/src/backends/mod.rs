//! Backend adapters — one module per supported LLM API.
//!
//! Each adapter translates the application layer's completion contract
//! to and from its provider's wire protocol. Three providers carry tool
//! calls natively (Anthropic content blocks, OpenAI `tool_calls`, Gemini
//! `functionCall` parts); Ollama has no native tool support and runs the
//! `TOOL_CALL:` text convention instead. Whatever the wire shape, every
//! response is normalized into the same [`ToolCompletion`] before the
//! reasoning loop sees it.
//!
//! The [`BackendRouter`] owns one adapter per configured backend and
//! resolves which one a given persona (or the moderator) runs on.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use anthropic::{ANTHROPIC, AnthropicBackend, AnthropicConfig};
pub use gemini::{GEMINI, GeminiBackend, GeminiConfig};
pub use ollama::{OLLAMA, OllamaBackend, OllamaConfig};
pub use openai::{OPENAI, OpenAiBackend, OpenAiConfig};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use agora_application::ports::backend::{BackendError, BackendResolver, LlmBackend};
use agora_domain::persona::{BackendRef, PersonaConfig};
use agora_domain::tool::ToolDefinition;

/// Timeout for a single completion request. Reasoning turns can run long,
/// so this is generous; anything slower is treated as a transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// Shared wire helpers
// ============================================================================

/// POST a JSON body and return the response text.
///
/// Non-2xx statuses become [`BackendError::Http`] carrying the status and
/// the full body, so provider error payloads survive to the caller.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    backend: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: &Value,
) -> Result<String, BackendError> {
    let mut request = client.post(url).json(body);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return Err(BackendError::Transport(e.to_string())),
    };

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(BackendError::Http {
            backend: backend.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

/// Decode a response body into JSON, mapping parse failures to
/// [`BackendError::InvalidResponse`].
pub(crate) fn decode_json(backend: &str, body: &str) -> Result<Value, BackendError> {
    serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(format!("{backend}: response is not JSON: {e}")))
}

/// JSON Schema for a tool's parameters, in the `{type: "object", ...}`
/// shape all three native-tool protocols accept.
pub(crate) fn tool_schema(def: &ToolDefinition) -> Value {
    let mut properties = serde_json::Map::new();
    for param in &def.parameters {
        properties.insert(
            param.name.clone(),
            serde_json::json!({
                "type": param.param_type,
                "description": param.description,
            }),
        );
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": def.required_parameters(),
    })
}

/// Read a JSON object into tool-call arguments; anything that is not an
/// object yields an empty argument map.
pub(crate) fn object_args(value: Option<&Value>) -> HashMap<String, Value> {
    match value {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => HashMap::new(),
    }
}

// ============================================================================
// Backends Config
// ============================================================================

/// Connection settings for every supported backend, plus which one is the
/// default. Personas without an override run on the default backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Name of the backend used when a persona carries no override
    pub default: String,
    pub anthropic: AnthropicConfig,
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            default: ANTHROPIC.to_string(),
            anthropic: AnthropicConfig::default(),
            openai: OpenAiConfig::default(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

// ============================================================================
// Backend Router
// ============================================================================

/// Resolves which backend each debate actor runs on.
///
/// The default and moderator backends are built eagerly so a misconfigured
/// name fails at wiring time, not mid-debate. Per-persona overrides are
/// built on first use and cached per `(backend, model)` pair; adapters
/// share one HTTP client.
pub struct BackendRouter {
    client: reqwest::Client,
    config: BackendsConfig,
    default_backend: Arc<dyn LlmBackend>,
    moderator_backend: Arc<dyn LlmBackend>,
    overrides: Mutex<HashMap<String, Arc<dyn LlmBackend>>>,
}

impl fmt::Debug for BackendRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRouter")
            .field("default", &self.default_backend.name())
            .field("moderator", &self.moderator_backend.name())
            .finish_non_exhaustive()
    }
}

impl BackendRouter {
    /// Build a router from backend settings and an optional moderator
    /// override. Fails when the default or moderator backend name is
    /// unknown, or when the HTTP client cannot be constructed.
    pub fn from_config(
        config: BackendsConfig,
        moderator: Option<&BackendRef>,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;

        let default_backend = build_adapter(&client, &config, &config.default, None)?;
        let moderator_backend = match moderator {
            Some(reference) => {
                build_adapter(&client, &config, &reference.backend, reference.model.as_deref())?
            }
            None => Arc::clone(&default_backend),
        };
        debug!(
            "Backend router ready: default = {}, moderator = {}",
            default_backend.name(),
            moderator_backend.name()
        );

        Ok(Self {
            client,
            config,
            default_backend,
            moderator_backend,
            overrides: Mutex::new(HashMap::new()),
        })
    }

    fn resolve_override(
        &self,
        name: &str,
        model: Option<&str>,
    ) -> Result<Arc<dyn LlmBackend>, BackendError> {
        let key = match model {
            Some(model) => format!("{name}/{model}"),
            None => name.to_string(),
        };
        let mut overrides = match self.overrides.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(backend) = overrides.get(&key) {
            return Ok(Arc::clone(backend));
        }
        let backend = build_adapter(&self.client, &self.config, name, model)?;
        debug!("Built backend override {}", key);
        overrides.insert(key, Arc::clone(&backend));
        Ok(backend)
    }
}

impl BackendResolver for BackendRouter {
    fn for_persona(&self, persona: &PersonaConfig) -> Result<Arc<dyn LlmBackend>, BackendError> {
        match &persona.backend {
            Some(reference) => self.resolve_override(&reference.backend, reference.model.as_deref()),
            None => Ok(Arc::clone(&self.default_backend)),
        }
    }

    fn for_moderator(&self) -> Arc<dyn LlmBackend> {
        Arc::clone(&self.moderator_backend)
    }
}

fn build_adapter(
    client: &reqwest::Client,
    config: &BackendsConfig,
    name: &str,
    model: Option<&str>,
) -> Result<Arc<dyn LlmBackend>, BackendError> {
    let backend: Arc<dyn LlmBackend> = match name {
        ANTHROPIC => {
            let mut adapter = AnthropicBackend::new(client.clone(), config.anthropic.clone());
            if let Some(model) = model {
                adapter = adapter.with_model(model);
            }
            Arc::new(adapter)
        }
        OPENAI => {
            let mut adapter = OpenAiBackend::new(client.clone(), config.openai.clone());
            if let Some(model) = model {
                adapter = adapter.with_model(model);
            }
            Arc::new(adapter)
        }
        GEMINI => {
            let mut adapter = GeminiBackend::new(client.clone(), config.gemini.clone());
            if let Some(model) = model {
                adapter = adapter.with_model(model);
            }
            Arc::new(adapter)
        }
        OLLAMA => {
            let mut adapter = OllamaBackend::new(client.clone(), config.ollama.clone());
            if let Some(model) = model {
                adapter = adapter.with_model(model);
            }
            Arc::new(adapter)
        }
        other => {
            return Err(BackendError::NotAvailable(format!(
                "unknown backend \"{other}\""
            )));
        }
    };
    Ok(backend)
}
