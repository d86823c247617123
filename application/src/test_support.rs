//! Shared fakes for use-case tests: a scripted backend, an in-memory tool
//! executor, and a recording step observer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agora_domain::persona::PersonaConfig;
use agora_domain::reasoning::ReasoningStep;
use agora_domain::session::entities::ChatMessage;
use agora_domain::session::response::{Completion, ToolCompletion};
use agora_domain::tool::{ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, ToolSpec};

use crate::ports::backend::{
    BackendError, BackendResolver, CompletionRequest, LlmBackend, ToolCompletionRequest,
};
use crate::ports::step_observer::StepObserver;
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort};

/// Backend that replays scripted responses in order and records every
/// request it receives.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    tool_responses: Mutex<VecDeque<ToolCompletion>>,
    completions: Mutex<VecDeque<Completion>>,
    histories: Mutex<Vec<Vec<ChatMessage>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn with_tool_responses(responses: Vec<ToolCompletion>) -> Self {
        Self {
            tool_responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn with_completions(completions: Vec<Completion>) -> Self {
        Self {
            completions: Mutex::new(completions.into()),
            ..Self::default()
        }
    }

    pub fn push_completion(&self, completion: Completion) {
        self.completions.lock().unwrap().push_back(completion);
    }

    /// Number of tool-aware requests served so far.
    pub fn tool_requests_seen(&self) -> usize {
        self.histories.lock().unwrap().len()
    }

    /// Message histories of every tool-aware request, in order.
    pub fn recorded_histories(&self) -> Vec<Vec<ChatMessage>> {
        self.histories.lock().unwrap().clone()
    }

    /// Prompts of every plain completion request, in order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, BackendError> {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::InvalidResponse("completion script exhausted".to_string()))
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest<'_>,
    ) -> Result<ToolCompletion, BackendError> {
        self.histories.lock().unwrap().push(request.messages.to_vec());
        self.tool_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::InvalidResponse("tool script exhausted".to_string()))
    }
}

/// Resolver that hands every actor the same backend.
pub(crate) struct SingleBackendResolver {
    backend: Arc<dyn LlmBackend>,
}

impl SingleBackendResolver {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }
}

impl BackendResolver for SingleBackendResolver {
    fn for_persona(&self, _persona: &PersonaConfig) -> Result<Arc<dyn LlmBackend>, BackendError> {
        Ok(self.backend.clone())
    }

    fn for_moderator(&self) -> Arc<dyn LlmBackend> {
        self.backend.clone()
    }
}

/// In-memory executor with a calculator and an echo tool.
pub(crate) struct FakeToolExecutor {
    spec: ToolSpec,
    calls: Mutex<Vec<String>>,
}

impl FakeToolExecutor {
    pub fn new() -> Self {
        let spec = ToolSpec::new()
            .register(
                ToolDefinition::new("calculator", "Evaluate an arithmetic expression")
                    .with_parameter(ToolParameter::new("expression", "Expression", true)),
            )
            .register(
                ToolDefinition::new("echo", "Echo the input back")
                    .with_parameter(ToolParameter::new("text", "Text to echo", true)),
            );
        Self {
            spec,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Tool names executed, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutorPort for FakeToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall, _context: &ToolContext) -> ToolResult {
        self.calls.lock().unwrap().push(call.name.clone());
        match call.name.as_str() {
            "calculator" => match call.get_str("expression") {
                Some("1/0") => ToolResult::failure(
                    "calculator",
                    ToolError::execution_failed("division by zero"),
                ),
                Some("120*12") => ToolResult::success("calculator", "1440"),
                Some("1+1") => ToolResult::success("calculator", "2"),
                Some(_) => ToolResult::success("calculator", "42"),
                None => ToolResult::failure(
                    "calculator",
                    ToolError::invalid_argument("Missing required argument: expression"),
                ),
            },
            "echo" => ToolResult::success("echo", call.get_str("text").unwrap_or("")),
            other => ToolResult::failure(other, ToolError::not_found(other)),
        }
    }
}

/// Observer that records every step it is shown.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    seen: Mutex<Vec<(String, ReasoningStep)>>,
}

impl RecordingObserver {
    pub fn seen(&self) -> Vec<(String, ReasoningStep)> {
        self.seen.lock().unwrap().clone()
    }
}

impl StepObserver for RecordingObserver {
    fn on_step(&self, actor_id: &str, step: &ReasoningStep) {
        self.seen
            .lock()
            .unwrap()
            .push((actor_id.to_string(), step.clone()));
    }
}
