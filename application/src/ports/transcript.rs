//! Transcript logger port
//!
//! Persists a machine-readable record of everything that happened in a
//! debate. Implementations (JSONL file writer, etc.) live in the
//! infrastructure layer.

use agora_domain::debate::DebateEvent;
use serde_json::Value;

/// A single transcript entry.
///
/// `entry_type` mirrors the event kind ("agent_argument", "round_complete",
/// ...); `payload` is the full serialized event. Timestamps are added by
/// the sink when the entry is written.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub entry_type: &'static str,
    pub payload: Value,
}

impl TranscriptEntry {
    pub fn new(entry_type: &'static str, payload: Value) -> Self {
        Self {
            entry_type,
            payload,
        }
    }
}

impl From<&DebateEvent> for TranscriptEntry {
    fn from(event: &DebateEvent) -> Self {
        let payload = serde_json::to_value(event).unwrap_or(Value::Null);
        Self::new(event.kind(), payload)
    }
}

/// Port for transcript logging
///
/// Synchronous and non-fallible: logging must never perturb a debate, so
/// implementations swallow (and internally report) their own I/O errors.
pub trait TranscriptLogger: Send + Sync {
    /// Record one entry.
    fn log(&self, entry: TranscriptEntry);
}

/// No-op logger used when no transcript path is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranscriptLogger;

impl TranscriptLogger for NoTranscriptLogger {
    fn log(&self, _entry: TranscriptEntry) {}
}

// ==================== Tests ====================
