//! Persona turn use case
//!
//! Assembles a persona's view of the debate (task, document excerpt,
//! windowed history, recalled insights), runs the reasoning loop, and
//! turns the outcome into a [`DebateArgument`] with its self-assessment
//! markers extracted.

use tracing::debug;

use agora_domain::config::DebateSettings;
use agora_domain::core::string::truncate;
use agora_domain::debate::DebateArgument;
use agora_domain::debate::parsing::extract_assessment;
use agora_domain::persona::PersonaConfig;
use agora_domain::prompt::DebatePrompt;

use crate::ports::backend::{BackendError, LlmBackend};
use crate::ports::step_observer::StepObserver;
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort};
use crate::use_cases::reasoning_loop::{ReasoningLoop, TurnRequest};

/// Everything a persona sees when it takes its turn.
pub struct PersonaTurnInput<'a> {
    pub persona: &'a PersonaConfig,
    pub round: u32,
    pub task: &'a str,
    pub document: Option<&'a str>,
    /// Labeled arguments so far, oldest first. Windowing is applied here,
    /// not by the caller.
    pub prior_arguments: &'a [(String, String)],
    /// Insights recalled for this persona, already rendered to text.
    pub insights: &'a [String],
    pub context: &'a ToolContext,
}

/// Runs a single persona turn.
pub struct PersonaTurn<'a> {
    backend: &'a dyn LlmBackend,
    tool_executor: &'a dyn ToolExecutorPort,
    observer: &'a dyn StepObserver,
    settings: &'a DebateSettings,
}

impl<'a> PersonaTurn<'a> {
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

    pub async fn run(&self, input: PersonaTurnInput<'_>) -> Result<DebateArgument, BackendError> {
        let excerpt = input
            .document
            .map(|d| truncate(d, self.settings.document_budget));

        let windowed = match self.settings.argument_window {
            Some(window) => {
                let skip = input.prior_arguments.len().saturating_sub(window);
                &input.prior_arguments[skip..]
            }
            None => input.prior_arguments,
        };

        let system = DebatePrompt::persona_system(input.persona);
        let prompt =
            DebatePrompt::persona_turn(input.task, excerpt.as_deref(), windowed, input.insights);
        let tools = self.tool_executor.tool_spec().subset(&input.persona.tools);

        let outcome = ReasoningLoop::new(
            self.backend,
            self.tool_executor,
            self.observer,
            self.settings.max_iterations,
        )
        .run(TurnRequest {
            actor_id: &input.persona.id,
            system: &system,
            prompt: &prompt,
            tools: &tools,
            context: input.context,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        })
        .await?;

        let (content, score, confidence) = extract_assessment(&outcome.content);
        debug!(
            "Persona {} finished round {} (score: {:?}, confidence: {:?}, tools: {})",
            input.persona.id,
            input.round,
            score,
            confidence,
            outcome.tools_used.len()
        );

        Ok(
            DebateArgument::new(&input.persona.id, input.round, content)
                .with_assessment(score, confidence)
                .with_tools_used(outcome.tools_used),
        )
    }
}

// ==================== PersonaTurn Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeToolExecutor, RecordingObserver, ScriptedBackend};
    use agora_domain::session::entities::ChatMessage;
    use agora_domain::session::response::ToolCompletion;

    fn persona() -> PersonaConfig {
        PersonaConfig::new("skeptic", "The Skeptic", "challenges assumptions")
            .with_tools(vec!["calculator".to_string()])
    }

    fn first_prompt(backend: &ScriptedBackend) -> String {
        let histories = backend.recorded_histories();
        match &histories[0][0] {
            ChatMessage::User { content } => content.clone(),
            other => panic!("expected user message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn extracts_assessment_markers_into_the_argument() {
        let backend = ScriptedBackend::with_tool_responses(vec![ToolCompletion::from_text(
            "The rollout is too risky this quarter.\nSCORE: 4\nCONFIDENCE: 0.8",
        )]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let settings = DebateSettings::default();
        let persona = persona();
        let context = ToolContext::new("rollout");

        let argument = PersonaTurn::new(&backend, &executor, &observer, &settings)
            .run(PersonaTurnInput {
                persona: &persona,
                round: 1,
                task: "Should we roll out now?",
                document: None,
                prior_arguments: &[],
                insights: &[],
                context: &context,
            })
            .await
            .unwrap();

        assert_eq!(argument.persona_id, "skeptic");
        assert_eq!(argument.round, 1);
        assert_eq!(argument.content, "The rollout is too risky this quarter.");
        assert_eq!(argument.score, Some(4));
        assert_eq!(argument.confidence, Some(0.8));
    }

    #[tokio::test]
    async fn argument_window_limits_visible_history() {
        let backend =
            ScriptedBackend::with_tool_responses(vec![ToolCompletion::from_text("Noted.")]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let settings = DebateSettings {
            argument_window: Some(1),
            ..DebateSettings::default()
        };
        let persona = persona();
        let context = ToolContext::new("t");
        let prior = vec![
            ("The Optimist (round 1)".to_string(), "First.".to_string()),
            ("The Skeptic (round 1)".to_string(), "Second.".to_string()),
            ("The Optimist (round 2)".to_string(), "Third.".to_string()),
        ];

        PersonaTurn::new(&backend, &executor, &observer, &settings)
            .run(PersonaTurnInput {
                persona: &persona,
                round: 2,
                task: "topic",
                document: None,
                prior_arguments: &prior,
                insights: &[],
                context: &context,
            })
            .await
            .unwrap();

        let prompt = first_prompt(&backend);
        assert!(prompt.contains("The Optimist (round 2)"));
        assert!(!prompt.contains("First."));
        assert!(!prompt.contains("Second."));
    }

    #[tokio::test]
    async fn document_is_truncated_to_budget() {
        let backend =
            ScriptedBackend::with_tool_responses(vec![ToolCompletion::from_text("Fine.")]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let settings = DebateSettings {
            document_budget: 20,
            ..DebateSettings::default()
        };
        let persona = persona();
        let context = ToolContext::new("t");
        let document = "x".repeat(500);

        PersonaTurn::new(&backend, &executor, &observer, &settings)
            .run(PersonaTurnInput {
                persona: &persona,
                round: 1,
                task: "topic",
                document: Some(&document),
                prior_arguments: &[],
                insights: &[],
                context: &context,
            })
            .await
            .unwrap();

        let prompt = first_prompt(&backend);
        assert!(prompt.contains("Reference document (excerpt):"));
        assert!(prompt.contains("..."));
        assert!(!prompt.contains(&"x".repeat(100)));
    }

    #[tokio::test]
    async fn insights_appear_in_the_prompt() {
        let backend = ScriptedBackend::with_tool_responses(vec![ToolCompletion::from_text("Ok.")]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let settings = DebateSettings::default();
        let persona = persona();
        let context = ToolContext::new("t");
        let insights = vec!["Costs were underestimated in round 1.".to_string()];

        PersonaTurn::new(&backend, &executor, &observer, &settings)
            .run(PersonaTurnInput {
                persona: &persona,
                round: 2,
                task: "topic",
                document: None,
                prior_arguments: &[],
                insights: &insights,
                context: &context,
            })
            .await
            .unwrap();

        let prompt = first_prompt(&backend);
        assert!(prompt.contains("Your notes from earlier rounds:"));
        assert!(prompt.contains("Costs were underestimated in round 1."));
    }
}
