//! Tool Executor port
//!
//! Defines the interface for executing tools personas and the moderator
//! invoke while reasoning.

use agora_domain::debate::DebateArgument;
use agora_domain::tool::{ToolCall, ToolDefinition, ToolResult, ToolSpec};
use async_trait::async_trait;

/// Debate-scoped data tools may read while executing.
///
/// Tools never mutate debate state; they see a snapshot of the task, the
/// reference document, and the arguments made so far.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// The question or proposal under debate
    pub task: String,
    /// Full reference document, if one was supplied
    pub document: Option<String>,
    /// Arguments recorded so far, in causal order
    pub arguments: Vec<DebateArgument>,
}

impl ToolContext {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            document: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<DebateArgument>) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Port for tool execution
///
/// This port defines how the application layer executes tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all registered tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is registered
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Execute a tool call against the given debate context.
    ///
    /// Never returns an error: failures (unknown tool, bad arguments,
    /// execution faults) are encoded in the returned [`ToolResult`] so the
    /// reasoning loop can feed them back to the model as observations.
    async fn execute(&self, call: &ToolCall, context: &ToolContext) -> ToolResult;
}
