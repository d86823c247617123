//! Run debate use case
//!
//! Drives a debate from its first round to the final summary: personas
//! speak in panel order, the moderator closes each round, and every
//! observable moment is emitted on the event channel and mirrored to the
//! transcript. The loop runs in a detached task; failures anywhere put
//! the debate into the error state instead of tearing anything else down.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use agora_domain::config::DebateSettings;
use agora_domain::core::error::DomainError;
use agora_domain::core::string::truncate;
use agora_domain::debate::{
    DebateArgument, DebateEvent, DebateState, DebateStatus, RoundDecision, Verdict,
};
use agora_domain::memory::{Insight, InsightStore};
use agora_domain::persona::PersonaConfig;
use agora_domain::reasoning::{ReasoningStep, StepKind};

use crate::events::EventChannel;
use crate::ports::backend::{BackendError, BackendResolver};
use crate::ports::step_observer::StepObserver;
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort};
use crate::ports::transcript::{TranscriptEntry, TranscriptLogger};
use crate::store::DebateStore;
use crate::use_cases::moderate::Moderator;
use crate::use_cases::persona_turn::{PersonaTurn, PersonaTurnInput};

/// How often a paused debate re-checks its status.
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Length cap when an argument is folded into the persona's own notes.
const INSIGHT_BUDGET: usize = 200;

/// Default confidence for insights whose argument carried no marker.
const DEFAULT_INSIGHT_CONFIDENCE: f32 = 0.5;

#[derive(Error, Debug)]
pub enum RunDebateError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Orchestrates one debate at a time; shared between all debates of a
/// [`crate::use_cases::debate_service::DebateService`].
pub struct RunDebateUseCase {
    store: Arc<DebateStore>,
    channel: Arc<EventChannel>,
    resolver: Arc<dyn BackendResolver>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    transcript: Arc<dyn TranscriptLogger>,
    settings: DebateSettings,
}

impl RunDebateUseCase {
    pub fn new(
        store: Arc<DebateStore>,
        channel: Arc<EventChannel>,
        resolver: Arc<dyn BackendResolver>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        transcript: Arc<dyn TranscriptLogger>,
        settings: DebateSettings,
    ) -> Self {
        Self {
            store,
            channel,
            resolver,
            tool_executor,
            transcript,
            settings,
        }
    }

    /// Transition the debate to debating and run it in a detached task.
    ///
    /// Returns as soon as the debate is started; progress is observed via
    /// the event channel. A second start (or starting a finished debate)
    /// fails with an invalid-transition error and spawns nothing.
    pub fn start(self: &Arc<Self>, debate_id: &str) -> Result<(), RunDebateError> {
        self.store.with_mut(debate_id, |s| s.start())??;
        let snapshot = self.store.snapshot(debate_id)?;
        info!(
            "Debate {} started: {} personas, max {} rounds",
            debate_id,
            snapshot.personas.len(),
            self.settings.max_rounds
        );
        self.emit(DebateEvent::debate_started(&snapshot));

        let runner = Arc::clone(self);
        let id = debate_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = runner.run(&id).await {
                error!("Debate {} failed: {}", id, err);
                let _ = runner.store.with_mut(&id, |s| s.fail(err.to_string()));
                runner.emit(DebateEvent::debate_error(&id, err.to_string()));
            }
        });
        Ok(())
    }

    /// The debate loop proper. Assumes the debate is already debating.
    async fn run(&self, debate_id: &str) -> Result<(), RunDebateError> {
        let mut insights = InsightStore::new();

        loop {
            self.wait_while_paused(debate_id).await?;
            let state = self.store.snapshot(debate_id)?;
            if state.status.is_terminal() {
                return Ok(());
            }
            let round = state.current_round;
            info!("Debate {} round {} begins", debate_id, round);
            self.emit(DebateEvent::round_started(debate_id, round));

            for persona in &state.personas {
                self.wait_while_paused(debate_id).await?;
                if self.store.status(debate_id)?.is_terminal() {
                    return Ok(());
                }
                self.take_persona_turn(debate_id, persona, round, &mut insights)
                    .await?;
            }

            self.wait_while_paused(debate_id).await?;
            let decision = self.moderate_round(debate_id, round).await?;
            match decision.verdict {
                Verdict::Continue => {
                    self.store.with_mut(debate_id, |s| s.next_round())??;
                }
                Verdict::Conclude => break,
            }
        }

        self.conclude(debate_id).await
    }

    /// One persona's turn: recall notes, reason, record the argument.
    async fn take_persona_turn(
        &self,
        debate_id: &str,
        persona: &PersonaConfig,
        round: u32,
        insights: &mut InsightStore,
    ) -> Result<(), RunDebateError> {
        self.store
            .with_mut(debate_id, |s| s.set_speaking(Some(persona.id.clone())))?;

        let snapshot = self.store.snapshot(debate_id)?;
        let prior = labeled_arguments(&snapshot, snapshot.all_arguments());
        let recalled: Vec<String> = insights
            .recall(&persona.id, &snapshot.task, round, self.settings.insight_limit)
            .into_iter()
            .map(|insight| insight.content.clone())
            .collect();

        let backend = self.resolver.for_persona(persona)?;
        let context = debate_context(&snapshot);
        let observer = self.observer_for(debate_id);

        let argument = PersonaTurn::new(
            backend.as_ref(),
            self.tool_executor.as_ref(),
            &observer,
            &self.settings,
        )
        .run(PersonaTurnInput {
            persona,
            round,
            task: &snapshot.task,
            document: snapshot.document.as_deref(),
            prior_arguments: &prior,
            insights: &recalled,
            context: &context,
        })
        .await?;

        if !argument.content.is_empty() {
            insights.record(
                &persona.id,
                Insight::new(
                    truncate(&argument.content, INSIGHT_BUDGET),
                    argument.confidence.unwrap_or(DEFAULT_INSIGHT_CONFIDENCE),
                    round,
                ),
            );
        }

        self.store.with_mut(debate_id, |s| {
            s.record_argument(argument.clone())?;
            s.set_speaking(None);
            Ok::<(), DomainError>(())
        })??;
        self.emit(DebateEvent::agent_argument(debate_id, argument));
        Ok(())
    }

    /// Moderator closes the round and decides whether the debate goes on.
    async fn moderate_round(
        &self,
        debate_id: &str,
        round: u32,
    ) -> Result<RoundDecision, RunDebateError> {
        let snapshot = self.store.snapshot(debate_id)?;
        let round_arguments = snapshot
            .current_round()
            .map(|r| labeled_arguments(&snapshot, r.arguments.iter().collect()))
            .unwrap_or_default();
        let context = debate_context(&snapshot);
        let observer = self.observer_for(debate_id);
        let backend = self.resolver.for_moderator();

        let (decision, steps) = Moderator::new(
            backend.as_ref(),
            self.tool_executor.as_ref(),
            &observer,
            &self.settings,
        )
        .evaluate_round(round, &round_arguments, &context)
        .await?;

        self.store
            .with_mut(debate_id, |s| s.complete_round(decision.clone(), steps))??;
        self.emit(DebateEvent::round_complete(debate_id, round, &decision));
        Ok(decision)
    }

    /// Synthesize the summary and move the debate to complete.
    async fn conclude(&self, debate_id: &str) -> Result<(), RunDebateError> {
        self.store.with_mut(debate_id, |s| s.begin_conclusion())??;

        let snapshot = self.store.snapshot(debate_id)?;
        let all_arguments = labeled_arguments(&snapshot, snapshot.all_arguments());
        let backend = self.resolver.for_moderator();
        let observer = self.observer_for(debate_id);

        let summary = Moderator::new(
            backend.as_ref(),
            self.tool_executor.as_ref(),
            &observer,
            &self.settings,
        )
        .generate_summary(&snapshot.task, &all_arguments)
        .await?;

        self.store
            .with_mut(debate_id, |s| s.complete(summary.clone()))??;
        info!(
            "Debate {} complete (consensus {})",
            debate_id, summary.consensus
        );
        self.emit(DebateEvent::debate_complete(debate_id, summary));
        Ok(())
    }

    /// Block (politely) while the debate is paused.
    async fn wait_while_paused(&self, debate_id: &str) -> Result<(), RunDebateError> {
        loop {
            if self.store.status(debate_id)? != DebateStatus::Paused {
                return Ok(());
            }
            tokio::time::sleep(PAUSE_POLL_INTERVAL).await;
        }
    }

    fn observer_for(&self, debate_id: &str) -> EventStepObserver {
        EventStepObserver {
            debate_id: debate_id.to_string(),
            channel: Arc::clone(&self.channel),
            transcript: Arc::clone(&self.transcript),
        }
    }

    pub(crate) fn emit(&self, event: DebateEvent) {
        self.transcript.log(TranscriptEntry::from(&event));
        self.channel.emit(event);
    }
}

/// Bridges reasoning steps onto the event channel. Observations stay out
/// of the stream; they are already visible on the round record.
struct EventStepObserver {
    debate_id: String,
    channel: Arc<EventChannel>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl StepObserver for EventStepObserver {
    fn on_step(&self, actor_id: &str, step: &ReasoningStep) {
        let event = match step.kind {
            StepKind::Thinking => {
                DebateEvent::agent_thinking(&self.debate_id, actor_id, &step.content)
            }
            StepKind::Acting => DebateEvent::agent_tool_use(
                &self.debate_id,
                actor_id,
                step.tool.as_deref().unwrap_or(""),
                &step.content,
            ),
            StepKind::Observing => return,
        };
        self.transcript.log(TranscriptEntry::from(&event));
        self.channel.emit(event);
    }
}

/// Tool context for the debate as it stands right now.
fn debate_context(state: &DebateState) -> ToolContext {
    let mut context = ToolContext::new(&state.task)
        .with_arguments(state.all_arguments().into_iter().cloned().collect());
    if let Some(document) = &state.document {
        context = context.with_document(document);
    }
    context
}

/// Arguments labeled for prompts: "Name (round N)".
fn labeled_arguments(state: &DebateState, arguments: Vec<&DebateArgument>) -> Vec<(String, String)> {
    arguments
        .into_iter()
        .map(|argument| {
            let name = state
                .persona(&argument.persona_id)
                .map(|p| p.name.as_str())
                .unwrap_or(argument.persona_id.as_str());
            (
                format!("{} (round {})", name, argument.round),
                argument.content.clone(),
            )
        })
        .collect()
}

// ==================== RunDebate Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::transcript::NoTranscriptLogger;
    use crate::test_support::{FakeToolExecutor, ScriptedBackend, SingleBackendResolver};
    use agora_domain::session::response::{Completion, ToolCompletion};

    fn personas() -> Vec<PersonaConfig> {
        vec![
            PersonaConfig::new("optimist", "The Optimist", "finds the upside")
                .with_tools(vec!["calculator".to_string()]),
            PersonaConfig::new("skeptic", "The Skeptic", "finds the risks")
                .with_tools(vec!["calculator".to_string()]),
        ]
    }

    struct Fixture {
        store: Arc<DebateStore>,
        channel: Arc<EventChannel>,
        backend: Arc<ScriptedBackend>,
        runner: Arc<RunDebateUseCase>,
    }

    fn fixture(backend: ScriptedBackend, settings: DebateSettings) -> Fixture {
        let store = Arc::new(DebateStore::new());
        let channel = Arc::new(EventChannel::new());
        let backend = Arc::new(backend);
        let runner = Arc::new(RunDebateUseCase::new(
            Arc::clone(&store),
            Arc::clone(&channel),
            Arc::new(SingleBackendResolver::new(backend.clone())),
            Arc::new(FakeToolExecutor::new()),
            Arc::new(NoTranscriptLogger),
            settings,
        ));
        Fixture {
            store,
            channel,
            backend,
            runner,
        }
    }

    #[tokio::test]
    async fn single_round_debate_runs_to_forced_conclusion() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion::from_text("Migration frees the team.\nSCORE: 4\nCONFIDENCE: 0.9"),
            ToolCompletion::from_text("Migration risks an outage.\nSCORE: 3\nCONFIDENCE: 0.6"),
            ToolCompletion::from_text("DECISION: CONTINUE\nREASONING: Worth another round."),
        ]);
        backend.push_completion(Completion::from_text(
            "CONSENSUS: 60\nKEY_AGREEMENTS:\n- Migration has value\nKEY_DISAGREEMENTS:\n- Timing\nRECOMMENDATION: Migrate after the freeze.\nREASONING: Value outweighs risk once staged.",
        ));
        let f = fixture(
            backend,
            DebateSettings {
                max_rounds: 1,
                ..DebateSettings::default()
            },
        );

        let id = f
            .store
            .insert(DebateState::new("Should we migrate?", None, personas()).unwrap());
        f.store.with_mut(&id, |s| s.start()).unwrap().unwrap();

        f.runner.run(&id).await.unwrap();

        let state = f.store.snapshot(&id).unwrap();
        assert_eq!(state.status, DebateStatus::Complete);
        assert_eq!(state.rounds.len(), 1);
        assert_eq!(state.rounds[0].arguments.len(), 2);
        assert_eq!(state.rounds[0].arguments[0].persona_id, "optimist");
        assert_eq!(state.rounds[0].arguments[1].persona_id, "skeptic");

        // The ceiling overrode the moderator's CONTINUE.
        let decision = state.rounds[0].decision.as_ref().unwrap();
        assert_eq!(decision.verdict, Verdict::Conclude);
        assert!(decision.forced);

        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.consensus, 60);
        assert_eq!(summary.recommendation, "Migrate after the freeze.");

        // Event stream: replay gives the whole story in order.
        let mut sub = f.channel.subscribe(&id);
        let kinds: Vec<&'static str> = std::iter::from_fn(|| sub.try_next())
            .map(|e| e.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "round_started",
                "agent_thinking",
                "agent_argument",
                "agent_thinking",
                "agent_argument",
                "agent_thinking",
                "round_complete",
                "debate_complete",
            ]
        );

        // The skeptic saw the optimist's argument, labeled.
        let histories = f.backend.recorded_histories();
        match &histories[1][0] {
            agora_domain::session::entities::ChatMessage::User { content } => {
                assert!(content.contains("The Optimist (round 1)"));
                assert!(content.contains("Migration frees the team."));
            }
            other => panic!("expected user message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn continue_verdict_opens_a_second_round() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            // Round 1
            ToolCompletion::from_text("Go."),
            ToolCompletion::from_text("Wait."),
            ToolCompletion::from_text("DECISION: CONTINUE\nREASONING: Unresolved."),
            // Round 2
            ToolCompletion::from_text("Still go."),
            ToolCompletion::from_text("Now convinced."),
            ToolCompletion::from_text("DECISION: CONCLUDE\nREASONING: Converged."),
        ]);
        backend.push_completion(Completion::from_text("RECOMMENDATION: Go."));
        let f = fixture(
            backend,
            DebateSettings {
                max_rounds: 3,
                ..DebateSettings::default()
            },
        );

        let id = f
            .store
            .insert(DebateState::new("Ship?", None, personas()).unwrap());
        f.store.with_mut(&id, |s| s.start()).unwrap().unwrap();
        f.runner.run(&id).await.unwrap();

        let state = f.store.snapshot(&id).unwrap();
        assert_eq!(state.status, DebateStatus::Complete);
        assert_eq!(state.rounds.len(), 2);
        assert_eq!(state.current_round, 2);
        assert!(!state.rounds[1].decision.as_ref().unwrap().forced);

        // Causal order across rounds.
        let order: Vec<(u32, &str)> = state
            .all_arguments()
            .iter()
            .map(|a| (a.round, a.persona_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "optimist"),
                (1, "skeptic"),
                (2, "optimist"),
                (2, "skeptic"),
            ]
        );
    }

    #[tokio::test]
    async fn start_spawns_and_failure_lands_in_error_state() {
        // Empty script: the first persona turn fails immediately.
        let f = fixture(ScriptedBackend::default(), DebateSettings::default());
        let id = f
            .store
            .insert(DebateState::new("Doomed?", None, personas()).unwrap());

        let mut sub = f.channel.subscribe(&id);
        f.runner.start(&id).unwrap();

        // Drain until the terminal event arrives.
        let mut saw_started = false;
        loop {
            let event = sub.next().await.unwrap();
            match event {
                DebateEvent::DebateStarted { .. } => saw_started = true,
                DebateEvent::DebateError { ref message, .. } => {
                    assert!(message.contains("script exhausted"));
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_started);

        let state = f.store.snapshot(&id).unwrap();
        assert_eq!(state.status, DebateStatus::Error);
        assert!(state.error.as_ref().unwrap().contains("script exhausted"));
    }

    #[tokio::test]
    async fn starting_twice_is_an_invalid_transition() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion::from_text("A."),
            ToolCompletion::from_text("B."),
            ToolCompletion::from_text("DECISION: CONCLUDE\nREASONING: Done."),
        ]);
        backend.push_completion(Completion::from_text("RECOMMENDATION: Done."));
        let f = fixture(backend, DebateSettings::default());
        let id = f
            .store
            .insert(DebateState::new("Once?", None, personas()).unwrap());

        f.runner.start(&id).unwrap();
        let err = f.runner.start(&id).unwrap_err();
        assert!(matches!(
            err,
            RunDebateError::Domain(DomainError::InvalidTransition { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_debate_makes_no_progress_until_resumed() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion::from_text("A."),
            ToolCompletion::from_text("B."),
            ToolCompletion::from_text("DECISION: CONCLUDE\nREASONING: Done."),
        ]);
        backend.push_completion(Completion::from_text("RECOMMENDATION: Fine."));
        let f = fixture(backend, DebateSettings::default());
        let id = f
            .store
            .insert(DebateState::new("Pausable?", None, personas()).unwrap());

        f.store
            .with_mut(&id, |s| {
                s.start().unwrap();
                assert!(s.pause());
            })
            .unwrap();

        let runner = Arc::clone(&f.runner);
        let run_id = id.clone();
        let handle = tokio::spawn(async move { runner.run(&run_id).await });

        // Let the runner hit the pause gate; nothing may reach the backend.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(f.backend.tool_requests_seen(), 0);

        f.store
            .with_mut(&id, |s| assert!(s.resume()))
            .unwrap();

        handle.await.unwrap().unwrap();
        assert_eq!(
            f.store.status(&id).unwrap(),
            DebateStatus::Complete
        );
    }
}
