//! Reasoning domain — the think/act/observe record of a single turn.
//!
//! Every persona turn (and every moderator evaluation) runs a bounded
//! reasoning loop. The loop appends a [`ReasoningStep`] for each phase it
//! passes through, so the trace of a turn can be streamed to observers and
//! kept on the round for inspection.

use serde::{Deserialize, Serialize};

/// Phase of a reasoning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Free-text reasoning emitted before or between tool calls
    Thinking,
    /// A tool invocation
    Acting,
    /// The observation fed back after a tool invocation
    Observing,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Thinking => "thinking",
            StepKind::Acting => "acting",
            StepKind::Observing => "observing",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded step of a reasoning turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub kind: StepKind,
    /// Thought text, tool input summary, or observation text
    pub content: String,
    /// Tool involved, for Acting and Observing steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl ReasoningStep {
    pub fn thinking(content: impl Into<String>) -> Self {
        Self {
            kind: StepKind::Thinking,
            content: content.into(),
            tool: None,
        }
    }

    pub fn acting(tool: impl Into<String>, input_summary: impl Into<String>) -> Self {
        Self {
            kind: StepKind::Acting,
            content: input_summary.into(),
            tool: Some(tool.into()),
        }
    }

    pub fn observing(tool: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            kind: StepKind::Observing,
            content: observation.into(),
            tool: Some(tool.into()),
        }
    }
}
