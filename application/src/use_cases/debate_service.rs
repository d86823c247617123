//! Debate service - the composition root's handle on everything
//!
//! Owns the store, the event channel, and the runner, and exposes the
//! operations a front end needs: create, start, pause/resume, inspect,
//! subscribe. Debates run detached; every method here returns without
//! blocking on model calls.

use std::sync::Arc;

use tracing::info;

use agora_domain::config::DebateSettings;
use agora_domain::core::error::DomainError;
use agora_domain::debate::{DebateArgument, DebateEvent, DebateState};
use agora_domain::persona::PersonaConfig;

use crate::events::{EventChannel, EventSubscription};
use crate::ports::backend::BackendResolver;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::transcript::TranscriptLogger;
use crate::store::DebateStore;
use crate::use_cases::run_debate::{RunDebateError, RunDebateUseCase};

pub struct DebateService {
    store: Arc<DebateStore>,
    channel: Arc<EventChannel>,
    runner: Arc<RunDebateUseCase>,
    resolver: Arc<dyn BackendResolver>,
}

impl DebateService {
    pub fn new(
        resolver: Arc<dyn BackendResolver>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        transcript: Arc<dyn TranscriptLogger>,
        settings: DebateSettings,
    ) -> Self {
        let store = Arc::new(DebateStore::new());
        let channel = Arc::new(EventChannel::new());
        let runner = Arc::new(RunDebateUseCase::new(
            Arc::clone(&store),
            Arc::clone(&channel),
            Arc::clone(&resolver),
            tool_executor,
            transcript,
            settings,
        ));
        Self {
            store,
            channel,
            runner,
            resolver,
        }
    }

    /// Create a debate in the idle state.
    ///
    /// Fails fast when a persona references a backend that is not
    /// registered, rather than surfacing it mid-debate.
    pub fn create(
        &self,
        task: impl Into<String>,
        document: Option<String>,
        personas: Vec<PersonaConfig>,
    ) -> Result<String, RunDebateError> {
        let personas = if personas.is_empty() {
            PersonaConfig::default_panel()
        } else {
            personas
        };
        for persona in &personas {
            self.resolver.for_persona(persona)?;
        }
        let state = DebateState::new(task, document, personas)?;
        let id = self.store.insert(state);
        info!("Created debate {}", id);
        Ok(id)
    }

    /// Start a debate; the run loop is detached and reports via events.
    pub fn start(&self, debate_id: &str) -> Result<(), RunDebateError> {
        self.runner.start(debate_id)
    }

    /// Pause a debating debate. Returns whether a transition happened;
    /// pausing anything else is a no-op.
    pub fn pause(&self, debate_id: &str) -> Result<bool, DomainError> {
        let paused = self.store.with_mut(debate_id, |s| s.pause())?;
        if paused {
            info!("Debate {} paused", debate_id);
            self.runner.emit(DebateEvent::debate_paused(debate_id));
        }
        Ok(paused)
    }

    /// Resume a paused debate. No-op unless currently paused.
    pub fn resume(&self, debate_id: &str) -> Result<bool, DomainError> {
        let resumed = self.store.with_mut(debate_id, |s| s.resume())?;
        if resumed {
            info!("Debate {} resumed", debate_id);
            self.runner.emit(DebateEvent::debate_resumed(debate_id));
        }
        Ok(resumed)
    }

    /// Snapshot of the debate's full state.
    pub fn state(&self, debate_id: &str) -> Result<DebateState, DomainError> {
        self.store.snapshot(debate_id)
    }

    /// All arguments so far, in causal order.
    pub fn arguments(&self, debate_id: &str) -> Result<Vec<DebateArgument>, DomainError> {
        self.store.arguments(debate_id)
    }

    /// Subscribe to a debate's events: buffered history first, then live.
    pub fn subscribe(&self, debate_id: &str) -> Result<EventSubscription, DomainError> {
        if !self.store.contains(debate_id) {
            return Err(DomainError::DebateNotFound(debate_id.to_string()));
        }
        Ok(self.channel.subscribe(debate_id))
    }

    /// Ids of every debate this service knows about.
    pub fn debate_ids(&self) -> Vec<String> {
        self.store.ids()
    }
}

// ==================== DebateService Tests ====================
