//! Tool domain module
//!
//! Defines how debate participants interact with tools during a reasoning
//! turn. Every tool is described by a [`ToolDefinition`], invoked via a
//! [`ToolCall`], and produces a [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (visible set)│    │ (invocation) │    │ (outcome)    │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Personas see only their configured subset of the registry
//! ([`ToolSpec::subset`]); the moderator sees the evaluator tools. Tool
//! failures are values, not errors — [`ToolResult::observation`] turns any
//! outcome into the text fed back to the model.
//!
//! Execution lives behind the application layer's `ToolExecutorPort`; this
//! module is pure definitions with no I/O.

pub mod entities;
pub mod value_objects;

pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use value_objects::{ToolError, ToolResult};
