//! LLM session domain.
//!
//! - [`entities::ChatMessage`] — provider-neutral conversation history
//! - [`response::Completion`] / [`response::ToolCompletion`] — normalized
//!   backend responses
//! - [`response::StopReason`] — why generation stopped

pub mod entities;
pub mod response;
