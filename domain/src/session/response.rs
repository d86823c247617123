//! Normalized backend responses.
//!
//! Four wire protocols feed the engine; all of them collapse into the two
//! shapes here. [`Completion`] answers a plain text request, [`ToolCompletion`]
//! answers a tool-enabled request. The [`StopReason`] is what drives the
//! reasoning loop: `ToolUse` means execute the calls and go around again,
//! anything else means the turn is over.

use crate::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// Reason the model stopped generating.
///
/// # Examples
///
/// ```
/// use agora_domain::session::response::{StopReason, ToolCompletion};
///
/// let response = ToolCompletion {
///     content: Some("Let me check the numbers.".to_string()),
///     tool_calls: vec![],
///     stop_reason: StopReason::EndTurn,
///     tokens_used: 42,
/// };
/// assert!(!response.has_tool_calls());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response — the turn is over.
    EndTurn,
    /// The model requested tools — execute them and send results back.
    ToolUse,
    /// Token limit hit — content may be truncated.
    MaxTokens,
    /// Backend-specific reason the engine does not interpret.
    Other(String),
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::ToolUse => "tool_use",
            StopReason::MaxTokens => "max_tokens",
            StopReason::Other(s) => s.as_str(),
        }
    }
}

/// Answer to a plain completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text.
    pub content: String,
    /// Total tokens the backend reported for the exchange (0 if unreported).
    pub tokens_used: u32,
    /// Why generation stopped.
    pub finish_reason: StopReason,
}

impl Completion {
    /// Wrap plain text as a natural-end completion.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tokens_used: 0,
            finish_reason: StopReason::EndTurn,
        }
    }

    pub fn with_tokens(mut self, tokens_used: u32) -> Self {
        self.tokens_used = tokens_used;
        self
    }
}

/// Answer to a tool-enabled completion request.
///
/// Normalized across backends: native tool-use protocols map their content
/// blocks / call arrays here, and the text-convention backend fills
/// `tool_calls` from pattern-extracted `TOOL_CALL:` lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCompletion {
    /// Assistant text, if any accompanied the calls.
    pub content: Option<String>,
    /// Requested tool invocations, in response order.
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Total tokens the backend reported (0 if unreported).
    pub tokens_used: u32,
}

impl ToolCompletion {
    /// A text-only response that requests no tools.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            stop_reason: StopReason::EndTurn,
            tokens_used: 0,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Assistant text, or empty when the response was calls-only.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
