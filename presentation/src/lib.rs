//! Presentation layer for agora
//!
//! This crate contains the CLI definitions and everything the terminal
//! user sees: the live event stream while a debate runs and the
//! formatted result once it concludes.

pub mod cli;
pub mod console;
pub mod stream;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use console::ConsoleFormatter;
pub use stream::EventPrinter;
