//! Logging infrastructure — structured transcript logging.
//!
//! Provides [`JsonlTranscriptLogger`], a JSONL file writer that implements
//! the [`TranscriptLogger`](agora_application::TranscriptLogger) port.

mod jsonl;

pub use jsonl::JsonlTranscriptLogger;
