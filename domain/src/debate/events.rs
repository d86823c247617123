//! Debate event stream vocabulary.
//!
//! Everything observable about a running debate is expressed as a
//! [`DebateEvent`]. Events are emitted in causal order by the run loop and
//! fanned out to subscribers; each carries the debate id and an RFC 3339
//! timestamp stamped at construction.

use super::entities::{
    DebateArgument, DebateState, DebateSummary, RoundDecision, Verdict, timestamp_now,
};
use serde::{Deserialize, Serialize};

/// One observable moment in a debate's life.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebateEvent {
    DebateStarted {
        debate_id: String,
        timestamp: String,
        task: String,
        /// Panel ids in speaking order
        personas: Vec<String>,
    },
    RoundStarted {
        debate_id: String,
        timestamp: String,
        round: u32,
    },
    AgentThinking {
        debate_id: String,
        timestamp: String,
        persona_id: String,
        content: String,
    },
    AgentToolUse {
        debate_id: String,
        timestamp: String,
        persona_id: String,
        tool: String,
        /// Compact rendering of the call arguments
        input: String,
    },
    AgentArgument {
        debate_id: String,
        timestamp: String,
        argument: Box<DebateArgument>,
    },
    RoundComplete {
        debate_id: String,
        timestamp: String,
        round: u32,
        verdict: Verdict,
        reasoning: String,
    },
    DebateComplete {
        debate_id: String,
        timestamp: String,
        summary: Box<DebateSummary>,
    },
    DebateError {
        debate_id: String,
        timestamp: String,
        message: String,
    },
    DebatePaused {
        debate_id: String,
        timestamp: String,
    },
    DebateResumed {
        debate_id: String,
        timestamp: String,
    },
}

impl DebateEvent {
    pub fn debate_started(state: &DebateState) -> Self {
        DebateEvent::DebateStarted {
            debate_id: state.id.to_string(),
            timestamp: timestamp_now(),
            task: state.task.clone(),
            personas: state.personas.iter().map(|p| p.id.clone()).collect(),
        }
    }

    pub fn round_started(debate_id: impl Into<String>, round: u32) -> Self {
        DebateEvent::RoundStarted {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            round,
        }
    }

    pub fn agent_thinking(
        debate_id: impl Into<String>,
        persona_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        DebateEvent::AgentThinking {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            persona_id: persona_id.into(),
            content: content.into(),
        }
    }

    pub fn agent_tool_use(
        debate_id: impl Into<String>,
        persona_id: impl Into<String>,
        tool: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        DebateEvent::AgentToolUse {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            persona_id: persona_id.into(),
            tool: tool.into(),
            input: input.into(),
        }
    }

    pub fn agent_argument(debate_id: impl Into<String>, argument: DebateArgument) -> Self {
        DebateEvent::AgentArgument {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            argument: Box::new(argument),
        }
    }

    pub fn round_complete(debate_id: impl Into<String>, round: u32, decision: &RoundDecision) -> Self {
        DebateEvent::RoundComplete {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            round,
            verdict: decision.verdict,
            reasoning: decision.reasoning.clone(),
        }
    }

    pub fn debate_complete(debate_id: impl Into<String>, summary: DebateSummary) -> Self {
        DebateEvent::DebateComplete {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            summary: Box::new(summary),
        }
    }

    pub fn debate_error(debate_id: impl Into<String>, message: impl Into<String>) -> Self {
        DebateEvent::DebateError {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
            message: message.into(),
        }
    }

    pub fn debate_paused(debate_id: impl Into<String>) -> Self {
        DebateEvent::DebatePaused {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
        }
    }

    pub fn debate_resumed(debate_id: impl Into<String>) -> Self {
        DebateEvent::DebateResumed {
            debate_id: debate_id.into(),
            timestamp: timestamp_now(),
        }
    }

    /// The debate this event belongs to.
    pub fn debate_id(&self) -> &str {
        match self {
            DebateEvent::DebateStarted { debate_id, .. }
            | DebateEvent::RoundStarted { debate_id, .. }
            | DebateEvent::AgentThinking { debate_id, .. }
            | DebateEvent::AgentToolUse { debate_id, .. }
            | DebateEvent::AgentArgument { debate_id, .. }
            | DebateEvent::RoundComplete { debate_id, .. }
            | DebateEvent::DebateComplete { debate_id, .. }
            | DebateEvent::DebateError { debate_id, .. }
            | DebateEvent::DebatePaused { debate_id, .. }
            | DebateEvent::DebateResumed { debate_id, .. } => debate_id,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            DebateEvent::DebateStarted { timestamp, .. }
            | DebateEvent::RoundStarted { timestamp, .. }
            | DebateEvent::AgentThinking { timestamp, .. }
            | DebateEvent::AgentToolUse { timestamp, .. }
            | DebateEvent::AgentArgument { timestamp, .. }
            | DebateEvent::RoundComplete { timestamp, .. }
            | DebateEvent::DebateComplete { timestamp, .. }
            | DebateEvent::DebateError { timestamp, .. }
            | DebateEvent::DebatePaused { timestamp, .. }
            | DebateEvent::DebateResumed { timestamp, .. } => timestamp,
        }
    }

    /// Stable snake_case name, used by transcripts and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            DebateEvent::DebateStarted { .. } => "debate_started",
            DebateEvent::RoundStarted { .. } => "round_started",
            DebateEvent::AgentThinking { .. } => "agent_thinking",
            DebateEvent::AgentToolUse { .. } => "agent_tool_use",
            DebateEvent::AgentArgument { .. } => "agent_argument",
            DebateEvent::RoundComplete { .. } => "round_complete",
            DebateEvent::DebateComplete { .. } => "debate_complete",
            DebateEvent::DebateError { .. } => "debate_error",
            DebateEvent::DebatePaused { .. } => "debate_paused",
            DebateEvent::DebateResumed { .. } => "debate_resumed",
        }
    }

    /// True for the two events that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DebateEvent::DebateComplete { .. } | DebateEvent::DebateError { .. }
        )
    }
}
