//! Prompt domain
//!
//! Templates for every prompt the engine sends: persona turns, moderator
//! round evaluations, the final summary, and the text tool-call protocol.

mod template;

pub use template::DebatePrompt;
