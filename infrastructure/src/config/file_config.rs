//! Raw TOML configuration data types
//!
//! These structs mirror the structure of an agora config file. Every
//! section and field has a default, so a file only names what it changes.
//!
//! ```toml
//! [debate]
//! max_rounds = 4
//!
//! [backends]
//! default = "ollama"
//!
//! [backends.ollama]
//! model = "llama3.2"
//!
//! [[personas]]
//! id = "historian"
//! name = "The Historian"
//! role = "argues from precedent"
//! ```

use std::collections::HashSet;

use agora_domain::config::{DebateSettings, OutputFormat};
use agora_domain::persona::{BackendRef, PersonaConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backends::BackendsConfig;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("max_rounds cannot be 0")]
    ZeroRounds,

    #[error("max_iterations cannot be 0")]
    ZeroIterations,

    #[error("persona id cannot be empty")]
    EmptyPersonaId,

    #[error("duplicate persona id \"{0}\"")]
    DuplicatePersonaId(String),
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format used when the CLI does not pass one
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// JSONL transcript destination; absent disables transcript logging
    pub transcript: Option<String>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            transcript: None,
        }
    }
}

/// Raw moderator configuration from TOML
///
/// The moderator runs on the default backend unless this section routes it
/// elsewhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModeratorConfig {
    /// Backend name, as registered with the router
    pub backend: Option<String>,
    /// Model override, backend-specific
    pub model: Option<String>,
}

impl FileModeratorConfig {
    /// The backend reference this section describes, if any
    pub fn backend_ref(&self) -> Option<BackendRef> {
        let mut reference = BackendRef::new(self.backend.as_ref()?);
        if let Some(model) = &self.model {
            reference = reference.with_model(model);
        }
        Some(reference)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Debate engine knobs
    pub debate: DebateSettings,
    /// Output settings
    pub output: FileOutputConfig,
    /// Backend adapters and the default route
    pub backends: BackendsConfig,
    /// Panel configuration; empty means the built-in four-persona panel
    pub personas: Vec<PersonaConfig>,
    /// Moderator settings
    pub moderator: FileModeratorConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.debate.max_rounds == 0 {
            return Err(ConfigValidationError::ZeroRounds);
        }
        if self.debate.max_iterations == 0 {
            return Err(ConfigValidationError::ZeroIterations);
        }

        let mut seen = HashSet::new();
        for persona in &self.personas {
            if persona.id.trim().is_empty() {
                return Err(ConfigValidationError::EmptyPersonaId);
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(ConfigValidationError::DuplicatePersonaId(
                    persona.id.clone(),
                ));
            }
        }

        Ok(())
    }

    /// The configured panel, or the built-in panel when none is configured
    pub fn panel(&self) -> Vec<PersonaConfig> {
        if self.personas.is_empty() {
            PersonaConfig::default_panel()
        } else {
            self.personas.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::persona::PersonaColor;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[debate]
max_rounds = 5
max_iterations = 8
temperature = 0.4

[output]
format = "full"
color = false
transcript = "debates/transcript.jsonl"

[backends]
default = "ollama"

[backends.ollama]
model = "mistral"

[moderator]
backend = "anthropic"
model = "claude-sonnet-4-5"

[[personas]]
id = "historian"
name = "The Historian"
role = "argues from precedent"
color = "blue"
tools = ["document_search"]

[[personas]]
id = "economist"
name = "The Economist"
role = "argues from incentives"
backend = { backend = "openai", model = "gpt-4o" }
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.debate.max_rounds, 5);
        assert_eq!(config.debate.max_iterations, 8);
        assert_eq!(config.debate.temperature, Some(0.4));
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert_eq!(
            config.output.transcript.as_deref(),
            Some("debates/transcript.jsonl")
        );
        assert_eq!(config.backends.default, "ollama");
        assert_eq!(config.backends.ollama.model, "mistral");

        let moderator = config.moderator.backend_ref().unwrap();
        assert_eq!(moderator.backend, "anthropic");
        assert_eq!(moderator.model.as_deref(), Some("claude-sonnet-4-5"));

        assert_eq!(config.personas.len(), 2);
        assert_eq!(config.personas[0].color, PersonaColor::Blue);
        assert_eq!(config.personas[0].tools, vec!["document_search"]);
        let economist = config.personas[1].backend.as_ref().unwrap();
        assert_eq!(economist.backend, "openai");
        assert_eq!(economist.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[debate]
max_rounds = 2
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.debate.max_rounds, 2);
        // Defaults should apply
        assert_eq!(config.debate.max_iterations, 5);
        assert!(config.output.color);
        assert_eq!(config.backends.default, "anthropic");
        assert!(config.personas.is_empty());
        assert!(config.moderator.backend_ref().is_none());
    }

    #[test]
    fn test_empty_personas_fall_back_to_builtin_panel() {
        let config = FileConfig::default();
        let panel = config.panel();
        assert_eq!(panel.len(), 4);
        assert_eq!(panel[0].id, "optimist");
    }

    #[test]
    fn test_configured_personas_replace_the_builtin_panel() {
        let toml_str = r#"
[[personas]]
id = "historian"
name = "The Historian"
role = "argues from precedent"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let panel = config.panel();
        assert_eq!(panel.len(), 1);
        assert_eq!(panel[0].id, "historian");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_rounds() {
        let toml_str = r#"
[debate]
max_rounds = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroRounds)
        ));
    }

    #[test]
    fn test_validate_duplicate_persona_id() {
        let toml_str = r#"
[[personas]]
id = "historian"
name = "A"
role = "r"

[[personas]]
id = "historian"
name = "B"
role = "r"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::DuplicatePersonaId(id)) if id == "historian"
        ));
    }

    #[test]
    fn test_validate_empty_persona_id() {
        let toml_str = r#"
[[personas]]
id = "  "
name = "A"
role = "r"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyPersonaId)
        ));
    }

    #[test]
    fn test_moderator_backend_without_model() {
        let toml_str = r#"
[moderator]
backend = "ollama"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let moderator = config.moderator.backend_ref().unwrap();
        assert_eq!(moderator.backend, "ollama");
        assert!(moderator.model.is_none());
    }
}
