//! Bounded tool-use reasoning loop
//!
//! Drives one actor turn (persona or moderator) against a backend: offer
//! tools, execute the calls the model makes, feed observations back, and
//! stop when the model answers in plain text or the iteration budget runs
//! out. Tool failures never abort the turn - they become observations the
//! model can react to.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use agora_domain::core::string::truncate;
use agora_domain::reasoning::ReasoningStep;
use agora_domain::session::entities::{ChatMessage, ToolObservation};
use agora_domain::tool::{ToolError, ToolResult, ToolSpec};

use crate::ports::backend::{BackendError, LlmBackend, ToolCompletionRequest};
use crate::ports::step_observer::StepObserver;
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort};

/// Longest tool-input summary carried on acting steps.
const INPUT_SUMMARY_BUDGET: usize = 200;

/// What a completed turn produced.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The actor's final prose (last non-empty text the model produced).
    pub content: String,
    /// Every reasoning step in order: thinking, acting, observing.
    pub steps: Vec<ReasoningStep>,
    /// Tools that executed successfully at least once, in first-use order.
    pub tools_used: Vec<String>,
}

/// One turn's worth of input to the loop.
pub struct TurnRequest<'a> {
    /// Persona id, or "moderator".
    pub actor_id: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    /// Tools visible to this actor for this turn. Calls outside this set
    /// are answered with an unknown-tool observation even if the executor
    /// knows the tool.
    pub tools: &'a ToolSpec,
    pub context: &'a ToolContext,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Executes turns against a backend with a bounded number of model calls.
pub struct ReasoningLoop<'a> {
    backend: &'a dyn LlmBackend,
    tool_executor: &'a dyn ToolExecutorPort,
    observer: &'a dyn StepObserver,
    max_iterations: u32,
}

impl<'a> ReasoningLoop<'a> {
    pub fn new(
        backend: &'a dyn LlmBackend,
        tool_executor: &'a dyn ToolExecutorPort,
        observer: &'a dyn StepObserver,
        max_iterations: u32,
    ) -> Self {
        Self {
            backend,
            tool_executor,
            observer,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Run one turn to completion.
    ///
    /// Makes at most `max_iterations` backend calls. If the budget runs out
    /// while the model is still requesting tools, the turn degrades to the
    /// last text produced rather than failing.
    pub async fn run(&self, request: TurnRequest<'_>) -> Result<LoopOutcome, BackendError> {
        let mut messages = vec![ChatMessage::user(request.prompt)];
        let mut steps: Vec<ReasoningStep> = Vec::new();
        let mut tools_used: Vec<String> = Vec::new();
        let mut last_text = String::new();

        for iteration in 1..=self.max_iterations {
            debug!(
                "Reasoning iteration {}/{} for {}",
                iteration, self.max_iterations, request.actor_id
            );

            let response = self
                .backend
                .complete_with_tools(
                    ToolCompletionRequest::new(&messages, request.tools)
                        .with_system(request.system)
                        .with_sampling(request.temperature, request.max_tokens),
                )
                .await?;

            let text = response.text().trim();
            if !text.is_empty() {
                last_text = text.to_string();
                let step = ReasoningStep::thinking(text);
                self.observer.on_step(request.actor_id, &step);
                steps.push(step);
            }

            if !response.has_tool_calls() {
                // Model answered in prose - the turn is done.
                return Ok(LoopOutcome {
                    content: last_text,
                    steps,
                    tools_used,
                });
            }

            if iteration == self.max_iterations {
                // Out of budget with calls still pending; don't execute
                // tools whose results the model will never see.
                warn!(
                    "Reasoning loop for {} exceeded max_iterations ({}) with tool calls pending",
                    request.actor_id, self.max_iterations
                );
                break;
            }

            messages.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            let mut observations = Vec::new();
            for call in &response.tool_calls {
                let acting = ReasoningStep::acting(&call.name, summarize_arguments(&call.arguments));
                self.observer.on_step(request.actor_id, &acting);
                steps.push(acting);

                let result = if request.tools.contains(&call.name) {
                    self.tool_executor.execute(call, request.context).await
                } else {
                    ToolResult::failure(&call.name, ToolError::not_found(&call.name))
                };

                if result.is_success() && !tools_used.contains(&call.name) {
                    tools_used.push(call.name.clone());
                }

                let observation = result.observation();
                debug!(
                    "Tool {} for {}: {}",
                    call.name,
                    request.actor_id,
                    if result.is_success() { "ok" } else { "failed" }
                );

                let observing = ReasoningStep::observing(&call.name, &observation);
                self.observer.on_step(request.actor_id, &observing);
                steps.push(observing);

                observations.push(ToolObservation::new(
                    &call.id,
                    &call.name,
                    observation,
                    !result.is_success(),
                ));
            }
            messages.push(ChatMessage::tool_results(observations));
        }

        let content = if last_text.is_empty() {
            format!(
                "No conclusion was reached within {} reasoning iterations.",
                self.max_iterations
            )
        } else {
            last_text
        };
        Ok(LoopOutcome {
            content,
            steps,
            tools_used,
        })
    }
}

/// Compact, key-ordered rendering of tool arguments for step traces.
fn summarize_arguments(arguments: &HashMap<String, serde_json::Value>) -> String {
    let ordered: BTreeMap<&String, &serde_json::Value> = arguments.iter().collect();
    let rendered = serde_json::to_string(&ordered).unwrap_or_else(|_| "{}".to_string());
    truncate(&rendered, INPUT_SUMMARY_BUDGET)
}

// ==================== ReasoningLoop Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeToolExecutor, RecordingObserver, ScriptedBackend};
    use agora_domain::reasoning::StepKind;
    use agora_domain::session::response::ToolCompletion;
    use agora_domain::tool::ToolCall;

    fn turn<'a>(tools: &'a ToolSpec, context: &'a ToolContext) -> TurnRequest<'a> {
        TurnRequest {
            actor_id: "optimist",
            system: "You are the optimist.",
            prompt: "Argue your position.",
            tools,
            context,
            temperature: None,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn returns_text_when_model_never_calls_tools() {
        let backend = ScriptedBackend::with_tool_responses(vec![ToolCompletion::from_text(
            "Cloud migration will pay for itself.",
        )]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("migration");

        let outcome = ReasoningLoop::new(&backend, &executor, &observer, 5)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        assert_eq!(outcome.content, "Cloud migration will pay for itself.");
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].kind, StepKind::Thinking);
        assert!(outcome.tools_used.is_empty());
        assert_eq!(backend.tool_requests_seen(), 1);
    }

    #[tokio::test]
    async fn feeds_tool_output_back_and_records_usage() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion {
                content: Some("Let me check the numbers.".to_string()),
                tool_calls: vec![
                    ToolCall::new("call_1", "calculator").with_arg("expression", "120*12"),
                ],
                stop_reason: agora_domain::session::response::StopReason::ToolUse,
                tokens_used: 0,
            },
            ToolCompletion::from_text("The savings come to 1440 per year."),
        ]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("budget");

        let outcome = ReasoningLoop::new(&backend, &executor, &observer, 5)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        assert_eq!(outcome.content, "The savings come to 1440 per year.");
        assert_eq!(outcome.tools_used, vec!["calculator".to_string()]);

        // Thinking, acting, observing, then the final thinking.
        let kinds: Vec<StepKind> = outcome.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Thinking,
                StepKind::Acting,
                StepKind::Observing,
                StepKind::Thinking,
            ]
        );

        // The second request must carry the observation back to the model.
        let histories = backend.recorded_histories();
        let second = &histories[1];
        match &second[2] {
            ChatMessage::ToolResults { results } => {
                assert_eq!(results[0].tool_name, "calculator");
                assert!(!results[0].is_error);
                assert_eq!(results[0].content, "1440");
            }
            other => panic!("expected tool results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_tool_becomes_error_observation_and_loop_continues() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion {
                content: None,
                tool_calls: vec![
                    ToolCall::new("call_1", "calculator").with_arg("expression", "1/0"),
                ],
                stop_reason: agora_domain::session::response::StopReason::ToolUse,
                tokens_used: 0,
            },
            ToolCompletion::from_text("I could not compute that, but my position stands."),
        ]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("budget");

        let outcome = ReasoningLoop::new(&backend, &executor, &observer, 5)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        assert_eq!(
            outcome.content,
            "I could not compute that, but my position stands."
        );
        // Failed executions are not counted as used tools.
        assert!(outcome.tools_used.is_empty());

        let histories = backend.recorded_histories();
        match &histories[1][2] {
            ChatMessage::ToolResults { results } => {
                assert!(results[0].is_error);
                assert!(results[0].content.starts_with("Error: "));
                assert!(results[0].content.contains("division by zero"));
            }
            other => panic!("expected tool results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_yields_synthetic_observation() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion {
                content: None,
                tool_calls: vec![ToolCall::new("call_1", "web_search").with_arg("query", "rust")],
                stop_reason: agora_domain::session::response::StopReason::ToolUse,
                tokens_used: 0,
            },
            ToolCompletion::from_text("Proceeding without a search."),
        ]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("task");

        let outcome = ReasoningLoop::new(&backend, &executor, &observer, 5)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        assert_eq!(outcome.content, "Proceeding without a search.");
        let histories = backend.recorded_histories();
        match &histories[1][2] {
            ChatMessage::ToolResults { results } => {
                assert!(results[0].is_error);
                assert_eq!(results[0].content, "Error: Unknown tool \"web_search\"");
            }
            other => panic!("expected tool results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_outside_turn_subset_is_unknown_even_if_registered() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion {
                content: None,
                tool_calls: vec![ToolCall::new("call_1", "echo").with_arg("text", "hi")],
                stop_reason: agora_domain::session::response::StopReason::ToolUse,
                tokens_used: 0,
            },
            ToolCompletion::from_text("Done."),
        ]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        // Only the calculator is visible this turn.
        let tools = executor.tool_spec().subset(&["calculator".to_string()]);
        let context = ToolContext::new("task");

        ReasoningLoop::new(&backend, &executor, &observer, 5)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        assert_eq!(executor.calls(), Vec::<String>::new());
        let histories = backend.recorded_histories();
        match &histories[1][2] {
            ChatMessage::ToolResults { results } => {
                assert_eq!(results[0].content, "Error: Unknown tool \"echo\"");
            }
            other => panic!("expected tool results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn iteration_budget_degrades_to_last_text() {
        let wants_tools = || ToolCompletion {
            content: Some("Still checking.".to_string()),
            tool_calls: vec![ToolCall::new("call_1", "calculator").with_arg("expression", "1+1")],
            stop_reason: agora_domain::session::response::StopReason::ToolUse,
            tokens_used: 0,
        };
        let backend = ScriptedBackend::with_tool_responses(vec![wants_tools(), wants_tools()]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("task");

        let outcome = ReasoningLoop::new(&backend, &executor, &observer, 2)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        // Budget of 2 means exactly 2 backend calls, and tools from the
        // final response are never executed.
        assert_eq!(backend.tool_requests_seen(), 2);
        assert_eq!(executor.calls(), vec!["calculator".to_string()]);
        assert_eq!(outcome.content, "Still checking.");
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        let backend = ScriptedBackend::with_tool_responses(vec![]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("task");

        let err = ReasoningLoop::new(&backend, &executor, &observer, 3)
            .run(turn(&tools, &context))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn observer_sees_steps_in_order() {
        let backend = ScriptedBackend::with_tool_responses(vec![
            ToolCompletion {
                content: None,
                tool_calls: vec![ToolCall::new("call_1", "echo").with_arg("text", "hello")],
                stop_reason: agora_domain::session::response::StopReason::ToolUse,
                tokens_used: 0,
            },
            ToolCompletion::from_text("hello back"),
        ]);
        let executor = FakeToolExecutor::new();
        let observer = RecordingObserver::default();
        let tools = executor.tool_spec().clone();
        let context = ToolContext::new("task");

        ReasoningLoop::new(&backend, &executor, &observer, 5)
            .run(turn(&tools, &context))
            .await
            .unwrap();

        let seen = observer.seen();
        let kinds: Vec<StepKind> = seen.iter().map(|(_, s)| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Acting, StepKind::Observing, StepKind::Thinking]
        );
        assert!(seen.iter().all(|(actor, _)| actor == "optimist"));
    }

    #[test]
    fn argument_summaries_are_key_ordered_and_bounded() {
        let mut args = HashMap::new();
        args.insert("zeta".to_string(), serde_json::json!(1));
        args.insert("alpha".to_string(), serde_json::json!("x"));
        let summary = summarize_arguments(&args);
        assert_eq!(summary, r#"{"alpha":"x","zeta":1}"#);

        let mut long = HashMap::new();
        long.insert("text".to_string(), serde_json::json!("y".repeat(500)));
        assert!(summarize_arguments(&long).len() <= INPUT_SUMMARY_BUDGET);
    }
}
