//! Event channel - replayable per-debate event streams
//!
//! Each debate gets a bounded replay buffer plus a list of live
//! subscribers. New subscribers first receive the buffered history, then
//! live events, with no gap or reordering in between: replay and
//! registration happen under the same lock that `emit` takes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;

use agora_domain::debate::DebateEvent;

/// Events retained per debate for late subscribers.
pub const EVENT_BUFFER_CAPACITY: usize = 100;

#[derive(Default)]
struct DebateStream {
    buffer: VecDeque<DebateEvent>,
    subscribers: Vec<mpsc::UnboundedSender<DebateEvent>>,
}

/// Fan-out hub for [`DebateEvent`]s, keyed by debate id.
#[derive(Default)]
pub struct EventChannel {
    streams: Mutex<HashMap<String, DebateStream>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DebateStream>> {
        match self.streams.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock poisons it; the map itself
            // is still usable.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append an event to the debate's buffer and deliver it to live
    /// subscribers. Subscribers that have gone away are pruned, never
    /// allowed to fail the emit.
    pub fn emit(&self, event: DebateEvent) {
        let mut streams = self.lock();
        let stream = streams.entry(event.debate_id().to_string()).or_default();

        if stream.buffer.len() == EVENT_BUFFER_CAPACITY {
            stream.buffer.pop_front();
        }
        stream.buffer.push_back(event.clone());

        stream.subscribers.retain(|tx| {
            if tx.send(event.clone()).is_ok() {
                true
            } else {
                debug!(debate_id = %event.debate_id(), "Pruning disconnected event subscriber");
                false
            }
        });
    }

    /// Subscribe to a debate's events.
    ///
    /// The returned subscription yields every buffered event first (up to
    /// the last [`EVENT_BUFFER_CAPACITY`]), then live events as they are
    /// emitted.
    pub fn subscribe(&self, debate_id: &str) -> EventSubscription {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut streams = self.lock();
        let stream = streams.entry(debate_id.to_string()).or_default();
        for event in &stream.buffer {
            // Receiver is in hand, send cannot fail here.
            let _ = tx.send(event.clone());
        }
        stream.subscribers.push(tx);

        EventSubscription { receiver: rx }
    }

    /// Number of events currently buffered for a debate.
    pub fn buffered(&self, debate_id: &str) -> usize {
        self.lock()
            .get(debate_id)
            .map(|s| s.buffer.len())
            .unwrap_or(0)
    }

    /// Number of live subscribers for a debate.
    pub fn subscriber_count(&self, debate_id: &str) -> usize {
        self.lock()
            .get(debate_id)
            .map(|s| s.subscribers.len())
            .unwrap_or(0)
    }
}

/// A single subscriber's view of one debate's event stream.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: mpsc::UnboundedReceiver<DebateEvent>,
}

impl EventSubscription {
    /// Next event, or `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<DebateEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking poll, for draining in tests.
    pub fn try_next(&mut self) -> Option<DebateEvent> {
        self.receiver.try_recv().ok()
    }
}

// ==================== EventChannel Tests ====================
