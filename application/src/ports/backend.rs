//! Backend port - abstraction over LLM provider APIs
//!
//! Every provider (Anthropic, OpenAI, Gemini, Ollama) is normalized to the
//! same two entry points: a plain text completion and a tool-aware
//! completion. The reasoning loop and the moderator only ever talk to this
//! trait, so provider differences (wire format, tool-call encoding, error
//! shapes) stay in the infrastructure layer.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use agora_domain::persona::PersonaConfig;
use agora_domain::session::entities::ChatMessage;
use agora_domain::session::response::{Completion, ToolCompletion};
use agora_domain::tool::ToolSpec;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when talking to an LLM backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// The provider answered with a non-success HTTP status.
    ///
    /// Status and body are always carried so failures stay diagnosable
    /// at the call site instead of degenerating into "request failed".
    #[error("{backend} returned HTTP {status}: {body}")]
    Http {
        backend: String,
        status: u16,
        body: String,
    },

    /// The request never produced an HTTP response (connect, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider responded 2xx but the payload did not match its schema.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No backend is registered under the requested name.
    #[error("Backend not available: {0}")]
    NotAvailable(String),
}

impl BackendError {
    /// HTTP status code, when the failure came from a provider response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// A plain text completion request (no tool access).
///
/// Used for the summary synthesis step, where the moderator must produce
/// prose rather than act.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            system: None,
            prompt,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: &'a str) -> Self {
        self.system = Some(system);
        self
    }

    /// Apply optional sampling settings in one call.
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// A tool-aware completion request carrying the conversation so far.
///
/// `messages` is the alternating user / assistant / tool-results history
/// built up by the reasoning loop. `tools` is the set visible for this
/// turn - adapters translate it into whatever schema their provider wants.
#[derive(Debug, Clone)]
pub struct ToolCompletionRequest<'a> {
    pub system: Option<&'a str>,
    pub messages: &'a [ChatMessage],
    pub tools: &'a ToolSpec,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl<'a> ToolCompletionRequest<'a> {
    pub fn new(messages: &'a [ChatMessage], tools: &'a ToolSpec) -> Self {
        Self {
            system: None,
            messages,
            tools,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: &'a str) -> Self {
        self.system = Some(system);
        self
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

// ============================================================================
// Port Traits
// ============================================================================

/// Port for LLM backends
///
/// Implementations normalize a provider's wire protocol into the shared
/// [`Completion`] / [`ToolCompletion`] contract. Providers without native
/// tool calling (e.g. plain text endpoints) are expected to emulate it and
/// still honor this trait.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Short identifier used in logs and error messages ("anthropic", "ollama", ...).
    fn name(&self) -> &str;

    /// One-shot text completion without tool access.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, BackendError>;

    /// Completion over a message history with tools offered to the model.
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest<'_>,
    ) -> Result<ToolCompletion, BackendError>;
}

/// Port for picking the backend a given actor runs on
///
/// The debate runner resolves a backend per persona turn, so per-persona
/// overrides (different provider or model) are honored without the runner
/// knowing how routing works.
pub trait BackendResolver: Send + Sync {
    /// Backend for a persona, honoring its `backend` override if set.
    fn for_persona(&self, persona: &PersonaConfig) -> Result<Arc<dyn LlmBackend>, BackendError>;

    /// Backend the moderator runs on.
    fn for_moderator(&self) -> Arc<dyn LlmBackend>;
}

// ==================== Tests ====================
