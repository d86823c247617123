//! Persona domain
//!
//! A debate is argued by a panel of personas. Each persona is an
//! independently configured point of view: a display name, a role it argues
//! from, free-form instructions, the tools it may call while reasoning, and
//! an optional backend override when one panelist should run on a different
//! model than the rest.
//!
//! Panel configuration is immutable once a debate starts; speaking order is
//! the configured order.

use serde::{Deserialize, Serialize};

/// Terminal color assigned to a persona's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonaColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    #[default]
    Cyan,
    White,
}

impl PersonaColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaColor::Red => "red",
            PersonaColor::Green => "green",
            PersonaColor::Yellow => "yellow",
            PersonaColor::Blue => "blue",
            PersonaColor::Magenta => "magenta",
            PersonaColor::Cyan => "cyan",
            PersonaColor::White => "white",
        }
    }
}

/// Routes one persona to a specific backend (and optionally a model).
///
/// When absent, the persona uses the engine's default backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRef {
    /// Backend name as registered with the router (e.g. "anthropic", "ollama")
    pub backend: String,
    /// Model identifier override, backend-specific
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl BackendRef {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Configuration for one debate participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Stable identifier, unique within a panel
    pub id: String,
    /// Display name
    pub name: String,
    /// Console color
    #[serde(default)]
    pub color: PersonaColor,
    /// One-line stance the persona argues from
    pub role: String,
    /// Free-form behavioral instructions appended to the system prompt
    #[serde(default)]
    pub instructions: String,
    /// Names of tools this persona may call (empty = no tools)
    #[serde(default)]
    pub tools: Vec<String>,
    /// Optional backend override for this persona
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendRef>,
}

impl PersonaConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: PersonaColor::default(),
            role: role.into(),
            instructions: String::new(),
            tools: Vec::new(),
            backend: None,
        }
    }

    pub fn with_color(mut self, color: PersonaColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_backend(mut self, backend: BackendRef) -> Self {
        self.backend = Some(backend);
        self
    }

    /// The standard four-persona panel used when no panel is configured.
    pub fn default_panel() -> Vec<PersonaConfig> {
        vec![
            PersonaConfig::new("optimist", "The Optimist", "argues for the upside")
                .with_color(PersonaColor::Green)
                .with_instructions(
                    "Highlight opportunities and best-case outcomes. Ground claims in the \
                     strongest available evidence rather than wishful thinking.",
                )
                .with_tools(vec![
                    "calculator".to_string(),
                    "document_search".to_string(),
                ]),
            PersonaConfig::new("skeptic", "The Skeptic", "stress-tests every claim")
                .with_color(PersonaColor::Red)
                .with_instructions(
                    "Probe for weaknesses, hidden costs, and failure modes. Demand evidence \
                     for claims made by other panelists.",
                )
                .with_tools(vec![
                    "calculator".to_string(),
                    "document_search".to_string(),
                ]),
            PersonaConfig::new("pragmatist", "The Pragmatist", "focuses on what is feasible")
                .with_color(PersonaColor::Yellow)
                .with_instructions(
                    "Weigh implementation cost, timelines, and second-order effects. Prefer \
                     workable compromises over ideal positions.",
                )
                .with_tools(vec![
                    "calculator".to_string(),
                    "document_search".to_string(),
                ]),
            PersonaConfig::new("ethicist", "The Ethicist", "examines fairness and consequences")
                .with_color(PersonaColor::Magenta)
                .with_instructions(
                    "Surface who is affected and how. Flag harms, externalities, and \
                     distributional concerns the other panelists gloss over.",
                )
                .with_tools(vec!["document_search".to_string()]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let persona = PersonaConfig::new("contrarian", "The Contrarian", "disagrees on principle")
            .with_color(PersonaColor::Blue)
            .with_instructions("Take the least popular defensible position.")
            .with_tools(vec!["calculator".to_string()])
            .with_backend(BackendRef::new("ollama").with_model("llama3.2"));

        assert_eq!(persona.id, "contrarian");
        assert_eq!(persona.color, PersonaColor::Blue);
        assert_eq!(persona.tools, vec!["calculator"]);
        let backend = persona.backend.unwrap();
        assert_eq!(backend.backend, "ollama");
        assert_eq!(backend.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_default_panel_ids_are_unique() {
        let panel = PersonaConfig::default_panel();
        assert_eq!(panel.len(), 4);
        let mut ids: Vec<&str> = panel.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_color_deserializes_lowercase() {
        let persona: PersonaConfig = serde_json::from_str(
            r#"{"id": "s", "name": "S", "role": "r", "color": "magenta"}"#,
        )
        .unwrap();
        assert_eq!(persona.color, PersonaColor::Magenta);
        assert!(persona.backend.is_none());
        assert!(persona.tools.is_empty());
    }
}
