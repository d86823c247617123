//! Step observer port
//!
//! Lets the debate runner surface intermediate reasoning (thinking, tool
//! use) as it happens, without the reasoning loop knowing about event
//! channels or terminals.

use agora_domain::reasoning::ReasoningStep;

/// Port for observing reasoning steps as they are produced.
///
/// All methods are no-ops by default so implementations only override
/// what they care about. Observers must never fail; anything fallible
/// belongs behind the implementation.
pub trait StepObserver: Send + Sync {
    /// Called once per step, in the order steps occur within a turn.
    fn on_step(&self, actor_id: &str, step: &ReasoningStep) {
        let _ = (actor_id, step);
    }
}

/// No-op observer for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStepObserver;

impl StepObserver for NoStepObserver {}
