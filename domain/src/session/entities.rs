//! Session domain entities — provider-neutral conversation history.
//!
//! Backends are stateless: every tool-use request carries the full history
//! of the turn so far. [`ChatMessage`] is the neutral form each adapter
//! translates into its own wire shape.

use crate::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// One entry in a turn's conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Plain user text (the turn's opening prompt)
    User { content: String },
    /// An assistant turn: optional text plus the tool calls it requested
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Observations answering the assistant's tool calls, in call order
    ToolResults { results: Vec<ToolObservation> },
}

/// The outcome of one tool call, addressed back to the call that made it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolObservation {
    /// Id of the [`ToolCall`] this observation answers
    pub call_id: String,
    pub tool_name: String,
    /// Observation text (already `Error: ...`-formatted for failures)
    pub content: String,
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        ChatMessage::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool_results(results: Vec<ToolObservation>) -> Self {
        ChatMessage::ToolResults { results }
    }
}

impl ToolObservation {
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
            is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_roundtrip() {
        let history = vec![
            ChatMessage::user("Estimate the savings."),
            ChatMessage::assistant(
                None,
                vec![ToolCall::new("call_1", "calculator").with_arg("expression", "120*12")],
            ),
            ChatMessage::tool_results(vec![ToolObservation::new(
                "call_1",
                "calculator",
                "1440",
                false,
            )]),
            ChatMessage::assistant_text("Roughly 1,440 per year."),
        ];

        let json = serde_json::to_string(&history).unwrap();
        let back: Vec<ChatMessage> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 4);
        match &back[1] {
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                assert!(content.is_none());
                assert_eq!(tool_calls[0].name, "calculator");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
