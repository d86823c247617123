//! Tool registry
//!
//! The [`ToolRegistry`] maps stable tool names to [`DebateTool`]
//! implementations and implements [`ToolExecutorPort`]. Execution never
//! returns an error: an unknown name, a missing required argument, or a
//! tool fault all come back as a failed [`ToolResult`] whose message the
//! reasoning loop feeds to the model as an observation.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use agora_application::ports::tool_executor::{ToolContext, ToolExecutorPort};
use agora_domain::tool::{ToolCall, ToolDefinition, ToolError, ToolResult, ToolSpec};

use super::{calculator, document, evaluators};

/// One executable tool.
///
/// Implementations are synchronous and pure over the call and the debate
/// context. Anything that fails returns a [`ToolError`] rather than
/// panicking, since the error text is what the model sees next.
pub trait DebateTool: Send + Sync {
    /// The definition advertised to backends.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool against the given call and debate context.
    fn execute(&self, call: &ToolCall, context: &ToolContext) -> Result<String, ToolError>;
}

/// Name-keyed registry of every tool the engine can execute.
///
/// Personas and the moderator each see a filtered [`ToolSpec`] subset; the
/// registry holds the superset and routes calls by name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn DebateTool>>,
    spec: ToolSpec,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            spec: ToolSpec::new(),
        }
    }

    /// A registry holding every built-in tool: the calculator, document
    /// search, and the moderator's evaluators.
    pub fn with_builtin_tools() -> Self {
        Self::new()
            .register(Box::new(calculator::Calculator))
            .register(Box::new(document::DocumentSearch))
            .register(Box::new(evaluators::ConsensusEvaluator))
            .register(Box::new(evaluators::ConflictEvaluator))
            .register(Box::new(evaluators::ProgressEvaluator))
    }

    /// Register a tool under the name its definition carries. Registering
    /// twice under one name replaces the earlier tool.
    pub fn register(mut self, tool: Box<dyn DebateTool>) -> Self {
        let definition = tool.definition();
        debug!(tool = %definition.name, "Registered tool");
        self.spec = std::mem::take(&mut self.spec).register(definition.clone());
        self.tools.insert(definition.name, tool);
        self
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall, context: &ToolContext) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            return ToolResult::failure(&call.name, ToolError::not_found(&call.name));
        };

        // Required parameters are checked here once so individual tools
        // only validate argument content, not presence.
        if let Some(definition) = self.spec.get(&call.name) {
            for name in definition.required_parameters() {
                if !call.arguments.contains_key(name) {
                    return ToolResult::failure(
                        &call.name,
                        ToolError::invalid_argument(format!("Missing required argument: {name}")),
                    );
                }
            }
        }

        match tool.execute(call, context) {
            Ok(output) => ToolResult::success(&call.name, output),
            Err(error) => ToolResult::failure(&call.name, error),
        }
    }
}

// ==================== Registry Tests ====================
