//! Moderator use case
//!
//! The moderator never argues. After each round it evaluates the
//! arguments (optionally using its analysis tools) and decides whether
//! the debate continues; once a debate concludes it synthesizes the
//! final summary. Both paths are robust to models that ignore the
//! response format: a missing decision falls back to a round-count
//! heuristic, and a free-form summary parses to sensible defaults.

use tracing::{debug, info};

use agora_domain::config::DebateSettings;
use agora_domain::debate::parsing::{parse_decision, parse_summary};
use agora_domain::debate::{DebateSummary, RoundDecision, Verdict};
use agora_domain::prompt::DebatePrompt;
use agora_domain::reasoning::ReasoningStep;

use crate::ports::backend::{BackendError, CompletionRequest, LlmBackend};
use crate::ports::step_observer::StepObserver;
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort};
use crate::use_cases::reasoning_loop::{ReasoningLoop, TurnRequest};

/// Actor id the moderator's steps and events are attributed to.
pub const MODERATOR_ID: &str = "moderator";

/// Analysis tools reserved for the moderator.
pub const MODERATOR_TOOLS: [&str; 3] = [
    "evaluate_consensus",
    "evaluate_conflict",
    "evaluate_progress",
];

/// Runs round evaluation and summary synthesis.
pub struct Moderator<'a> {
    backend: &'a dyn LlmBackend,
    tool_executor: &'a dyn ToolExecutorPort,
    observer: &'a dyn StepObserver,
    settings: &'a DebateSettings,
}

impl<'a> Moderator<'a> {
    pub fn new(
        backend: &'a dyn LlmBackend,
        tool_executor: &'a dyn ToolExecutorPort,
        observer: &'a dyn StepObserver,
        settings: &'a DebateSettings,
    ) -> Self {
        Self {
            backend,
            tool_executor,
            observer,
            settings,
        }
    }

    /// Decide whether the debate continues after `round`.
    ///
    /// Also returns the moderator's reasoning steps so they can be kept on
    /// the round record.
    pub async fn evaluate_round(
        &self,
        round: u32,
        round_arguments: &[(String, String)],
        context: &ToolContext,
    ) -> Result<(RoundDecision, Vec<ReasoningStep>), BackendError> {
        let names: Vec<String> = MODERATOR_TOOLS.iter().map(|s| s.to_string()).collect();
        let tools = self.tool_executor.tool_spec().subset(&names);
        let prompt =
            DebatePrompt::round_evaluation(round, self.settings.max_rounds, round_arguments);

        let outcome = ReasoningLoop::new(
            self.backend,
            self.tool_executor,
            self.observer,
            self.settings.max_iterations,
        )
        .run(TurnRequest {
            actor_id: MODERATOR_ID,
            system: DebatePrompt::moderator_system(),
            prompt: &prompt,
            tools: &tools,
            context,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        })
        .await?;

        let decision = match parse_decision(&outcome.content) {
            Some(decision) => {
                debug!(
                    "Moderator decided {} after round {}: {}",
                    decision.verdict, round, decision.reasoning
                );
                decision
            }
            None => {
                // Model ignored the format; fall back to a round-count
                // heuristic rather than stalling the debate.
                let decision = if round < self.settings.max_rounds / 2 {
                    RoundDecision::new(
                        Verdict::Continue,
                        "No explicit decision from the moderator; continuing while the debate is young.",
                    )
                } else {
                    RoundDecision::new(
                        Verdict::Conclude,
                        "No explicit decision from the moderator; concluding.",
                    )
                };
                debug!(
                    "Moderator gave no parseable decision after round {}; heuristic says {}",
                    round, decision.verdict
                );
                decision
            }
        };

        // The round ceiling always wins.
        let decision = if round >= self.settings.max_rounds && decision.verdict == Verdict::Continue
        {
            info!(
                "Round ceiling reached ({}); forcing conclusion",
                self.settings.max_rounds
            );
            RoundDecision::forced(
                Verdict::Conclude,
                format!("Round limit of {} reached.", self.settings.max_rounds),
            )
        } else {
            decision
        };

        Ok((decision, outcome.steps))
    }

    /// Synthesize the final summary over the whole debate.
    ///
    /// Tool-free on purpose: the moderator is asked for prose, not actions.
    pub async fn generate_summary(
        &self,
        task: &str,
        all_arguments: &[(String, String)],
    ) -> Result<DebateSummary, BackendError> {
        let prompt = DebatePrompt::summary_request(task, all_arguments);
        let completion = self
            .backend
            .complete(
                CompletionRequest::new(&prompt)
                    .with_system(DebatePrompt::summary_system())
                    .with_sampling(self.settings.temperature, self.settings.max_tokens),
            )
            .await?;

        Ok(parse_summary(&completion.content))
    }
}

// ==================== Moderator Tests ====================
