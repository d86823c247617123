//! Debate domain
//!
//! The central subdomain: a debate is a panel of personas arguing a task
//! over moderated rounds until the moderator (or the round ceiling)
//! concludes it.
//!
//! - [`entities`] — [`DebateState`](entities::DebateState) and the lifecycle
//!   state machine, rounds, arguments, decisions, the final summary
//! - [`events`] — the observable event stream vocabulary
//! - [`parsing`] — marker extraction from free-text model responses
//!
//! ```text
//! idle ──▶ debating ──▶ concluding ──▶ complete
//!            │  ▲ │
//!            ▼  │ └────────────────▶ error (from any state)
//!          paused
//! ```

pub mod entities;
pub mod events;
pub mod parsing;

pub use entities::{
    DebateArgument, DebateId, DebateRound, DebateState, DebateStatus, DebateSummary,
    RoundDecision, Verdict,
};
pub use events::DebateEvent;
