//! Infrastructure layer for agora
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the four LLM backend adapters and their router, the
//! built-in tools, configuration file loading, and transcript logging.

pub mod backends;
pub mod config;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use backends::{
    AnthropicBackend, BackendRouter, BackendsConfig, GeminiBackend, OllamaBackend, OpenAiBackend,
};
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig};
pub use logging::JsonlTranscriptLogger;
pub use tools::{DebateTool, ToolRegistry};
