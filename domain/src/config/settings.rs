//! Debate engine settings value object

use serde::{Deserialize, Serialize};

/// Tunable knobs of the debate engine.
///
/// All fields have defaults, so a config file only needs to name what it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSettings {
    /// Hard ceiling on rounds; the moderator is overridden at this point
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Reasoning loop iteration bound per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// How many trailing prior arguments a persona sees (None = all)
    #[serde(default)]
    pub argument_window: Option<usize>,
    /// Byte budget for the document excerpt in persona prompts
    #[serde(default = "default_document_budget")]
    pub document_budget: usize,
    /// How many remembered insights are recalled per turn
    #[serde(default = "default_insight_limit")]
    pub insight_limit: usize,
    /// Sampling temperature passed to backends when set
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Token ceiling passed to backends when set
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_max_rounds() -> u32 {
    3
}

fn default_max_iterations() -> u32 {
    5
}

fn default_document_budget() -> usize {
    2000
}

fn default_insight_limit() -> usize {
    3
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            max_iterations: default_max_iterations(),
            argument_window: None,
            document_budget: default_document_budget(),
            insight_limit: default_insight_limit(),
            temperature: None,
            max_tokens: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DebateSettings::default();
        assert_eq!(settings.max_rounds, 3);
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.argument_window, None);
        assert_eq!(settings.document_budget, 2000);
        assert_eq!(settings.insight_limit, 3);
        assert!(settings.temperature.is_none());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let settings: DebateSettings =
            serde_json::from_str(r#"{"max_rounds": 5, "argument_window": 6}"#).unwrap();
        assert_eq!(settings.max_rounds, 5);
        assert_eq!(settings.argument_window, Some(6));
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.document_budget, 2000);
    }
}
