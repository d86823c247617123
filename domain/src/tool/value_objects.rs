//! Tool domain value objects — immutable result and error types
//!
//! The output side of the tool pipeline. Every execution produces a
//! [`ToolResult`]; failures carry a [`ToolError`] whose message becomes the
//! observation the reasoning loop feeds back to the model (`Error: <message>`).
//! Failures are data, not control flow: a failed tool never aborts a turn.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "EXECUTION_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Unknown tool name
    pub fn not_found(tool: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Unknown tool \"{}\"", tool.into()))
    }

    /// Missing or malformed arguments
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    /// Runtime failure inside the tool itself
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution, carrying output or error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// The text the reasoning loop records as this execution's observation:
    /// the output on success, `Error: <message>` on failure.
    pub fn observation(&self) -> String {
        if self.success {
            self.output.clone().unwrap_or_default()
        } else {
            let message = self
                .error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("tool failed");
            format!("Error: {}", message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_constructors() {
        let err = ToolError::not_found("web_search");
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Unknown tool \"web_search\"");

        let err = ToolError::execution_failed("division by zero");
        assert_eq!(err.code, "EXECUTION_FAILED");
        assert_eq!(err.to_string(), "[EXECUTION_FAILED] division by zero");
    }

    #[test]
    fn test_success_observation_is_output() {
        let result = ToolResult::success("calculator", "4");
        assert!(result.is_success());
        assert_eq!(result.observation(), "4");
    }

    #[test]
    fn test_failure_observation_is_error_line() {
        let result = ToolResult::failure(
            "calculator",
            ToolError::execution_failed("division by zero"),
        );
        assert!(!result.is_success());
        assert!(result.output().is_none());
        assert_eq!(result.observation(), "Error: division by zero");
    }
}
