//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Definition of a tool a persona (or the moderator) may call while reasoning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "calculator")
    pub name: String,
    /// Human-readable description, sent to the backend verbatim
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// JSON type hint ("string", "number", "boolean")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Names of required parameters, in declaration order
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// The set of tools visible to one reasoning turn.
///
/// The full registry lives in the infrastructure layer; a `ToolSpec` is the
/// filtered view handed to a persona (its configured subset) or to the
/// moderator (the evaluator tools). Definitions are sent to backends in
/// name order so request payloads are deterministic.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Definitions sorted by name, the order used on the wire
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        let mut defs: Vec<&ToolDefinition> = self.tools.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// A new spec containing only the named tools; unknown names are skipped
    pub fn subset(&self, names: &[String]) -> ToolSpec {
        let mut subset = ToolSpec::new();
        for name in names {
            if let Some(def) = self.tools.get(name) {
                subset = subset.register(def.clone());
            }
        }
        subset
    }
}

/// A single tool invocation requested by a backend response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier used to match results back to the request.
    /// Backends without native ids get synthesized ones.
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: HashMap<String, serde_json::Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Get a string argument
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or an error message suitable for a
    /// tool failure observation
    pub fn require_str(&self, key: &str) -> Result<&str, String> {
        self.get_str(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get a numeric argument
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }

    /// Get a boolean argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(|v| v.as_bool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_builder() {
        let tool = ToolDefinition::new("calculator", "Evaluate an arithmetic expression")
            .with_parameter(
                ToolParameter::new("expression", "Expression to evaluate", true),
            )
            .with_parameter(
                ToolParameter::new("precision", "Decimal places", false).with_type("number"),
            );

        assert_eq!(tool.name, "calculator");
        assert_eq!(tool.parameters.len(), 2);
        assert_eq!(tool.required_parameters(), vec!["expression"]);
        assert_eq!(tool.parameters[1].param_type, "number");
    }

    #[test]
    fn test_spec_definitions_are_name_ordered() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("document_search", "Search the document"))
            .register(ToolDefinition::new("calculator", "Evaluate arithmetic"));

        let names: Vec<&str> = spec.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["calculator", "document_search"]);
    }

    #[test]
    fn test_spec_subset_skips_unknown_names() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("calculator", "Evaluate arithmetic"))
            .register(ToolDefinition::new("evaluate_consensus", "Score agreement"));

        let subset = spec.subset(&["calculator".to_string(), "web_search".to_string()]);
        assert_eq!(subset.len(), 1);
        assert!(subset.contains("calculator"));
        assert!(!subset.contains("evaluate_consensus"));
    }

    #[test]
    fn test_tool_call_arguments() {
        let call = ToolCall::new("call_1", "calculator").with_arg("expression", "2+2");

        assert_eq!(call.name, "calculator");
        assert_eq!(call.get_str("expression"), Some("2+2"));
        assert_eq!(call.require_str("expression").unwrap(), "2+2");
        assert_eq!(
            call.require_str("missing").unwrap_err(),
            "Missing required argument: missing"
        );
        assert!(call.get_f64("expression").is_none());
    }
}
