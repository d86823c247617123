//! Application layer for agora
//!
//! This crate contains use cases, port definitions, the in-memory debate
//! store, and the event channel. It depends only on the domain layer.

pub mod events;
pub mod ports;
pub mod store;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use events::{EVENT_BUFFER_CAPACITY, EventChannel, EventSubscription};
pub use ports::{
    backend::{
        BackendError, BackendResolver, CompletionRequest, LlmBackend, ToolCompletionRequest,
    },
    step_observer::{NoStepObserver, StepObserver},
    tool_executor::{ToolContext, ToolExecutorPort},
    transcript::{NoTranscriptLogger, TranscriptEntry, TranscriptLogger},
};
pub use store::DebateStore;
pub use use_cases::debate_service::DebateService;
pub use use_cases::moderate::{MODERATOR_ID, MODERATOR_TOOLS, Moderator};
pub use use_cases::persona_turn::{PersonaTurn, PersonaTurnInput};
pub use use_cases::reasoning_loop::{LoopOutcome, ReasoningLoop, TurnRequest};
pub use use_cases::run_debate::{RunDebateError, RunDebateUseCase};
