//! Event streaming for in-flight debates.

pub mod channel;

pub use channel::{EVENT_BUFFER_CAPACITY, EventChannel, EventSubscription};
