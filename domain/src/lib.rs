//! Domain layer for agora
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Debate
//!
//! A debate is a panel of **personas** arguing a task over moderated
//! **rounds**:
//!
//! - Personas speak in configured order; each turn runs a bounded
//!   reasoning loop with the persona's tools
//! - A non-arguing **moderator** decides after every round whether to
//!   continue or conclude, and writes the final synthesis
//! - Everything observable is a [`DebateEvent`] in causal order
//!
//! ## Normalization
//!
//! Free-text model responses carry structure by convention: `SCORE:` /
//! `CONFIDENCE:` self-assessments, `DECISION:` verdicts, summary sections,
//! and the `TOOL_CALL:` protocol for backends without native tool support.
//! [`debate::parsing`] recovers all of it with documented defaults.

pub mod config;
pub mod core;
pub mod debate;
pub mod memory;
pub mod persona;
pub mod prompt;
pub mod reasoning;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use config::{DebateSettings, OutputFormat};
pub use core::error::DomainError;
pub use debate::{
    entities::{
        DebateArgument, DebateId, DebateRound, DebateState, DebateStatus, DebateSummary,
        RoundDecision, Verdict,
    },
    events::DebateEvent,
    parsing::{extract_assessment, parse_decision, parse_summary, split_text_tool_calls},
};
pub use memory::{Insight, InsightStore};
pub use persona::{BackendRef, PersonaColor, PersonaConfig};
pub use prompt::DebatePrompt;
pub use reasoning::{ReasoningStep, StepKind};
pub use session::{
    entities::{ChatMessage, ToolObservation},
    response::{Completion, StopReason, ToolCompletion},
};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    value_objects::{ToolError, ToolResult},
};
