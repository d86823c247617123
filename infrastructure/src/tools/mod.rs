//! Tool implementations for the debate engine
//!
//! Concrete tools personas and the moderator can call while reasoning:
//!
//! - `calculator`: arithmetic over the model's own numbers
//! - `document`: keyword search across the debate's reference document
//! - `evaluators`: the moderator's consensus/conflict/progress summaries
//!
//! The [`ToolRegistry`] aggregates them behind the application layer's
//! executor port; personas see a configured subset of the full spec.

pub mod calculator;
pub mod document;
pub mod evaluators;

mod registry;

pub use registry::{DebateTool, ToolRegistry};
