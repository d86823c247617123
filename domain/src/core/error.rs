//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No personas configured for the debate")]
    NoPersonas,

    #[error("Debate not found: {0}")]
    DebateNotFound(String),

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Persona {persona} already argued in round {round}")]
    DuplicateArgument { persona: String, round: u32 },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid task: {0}")]
    InvalidTask(String),
}

impl DomainError {
    /// Check if this error is a missing-debate lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::DebateNotFound(_))
    }
}
