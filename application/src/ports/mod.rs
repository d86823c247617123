//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod backend;
pub mod step_observer;
pub mod tool_executor;
pub mod transcript;
