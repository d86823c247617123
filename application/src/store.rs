//! In-memory debate store
//!
//! Holds every [`DebateState`] behind a single `RwLock`. The run loop is
//! the only writer for a given debate; reads hand out clones so callers
//! never observe a state mid-mutation. Closures passed to [`DebateStore::with_mut`]
//! must stay synchronous - the lock is never held across an await.

use std::collections::HashMap;
use std::sync::RwLock;

use agora_domain::core::error::DomainError;
use agora_domain::debate::{DebateArgument, DebateState, DebateStatus};

#[derive(Default)]
pub struct DebateStore {
    debates: RwLock<HashMap<String, DebateState>>,
}

impl DebateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created debate, returning its id.
    pub fn insert(&self, state: DebateState) -> String {
        let id = state.id.as_str().to_string();
        let mut debates = match self.debates.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debates.insert(id.clone(), state);
        id
    }

    /// Run a synchronous mutation against one debate.
    pub fn with_mut<R>(
        &self,
        debate_id: &str,
        f: impl FnOnce(&mut DebateState) -> R,
    ) -> Result<R, DomainError> {
        let mut debates = match self.debates.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let state = debates
            .get_mut(debate_id)
            .ok_or_else(|| DomainError::DebateNotFound(debate_id.to_string()))?;
        Ok(f(state))
    }

    /// Full clone of a debate's current state.
    pub fn snapshot(&self, debate_id: &str) -> Result<DebateState, DomainError> {
        let debates = match self.debates.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debates
            .get(debate_id)
            .cloned()
            .ok_or_else(|| DomainError::DebateNotFound(debate_id.to_string()))
    }

    /// Current status without cloning the whole state.
    pub fn status(&self, debate_id: &str) -> Result<DebateStatus, DomainError> {
        let debates = match self.debates.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debates
            .get(debate_id)
            .map(|s| s.status)
            .ok_or_else(|| DomainError::DebateNotFound(debate_id.to_string()))
    }

    /// All arguments of a debate in causal order.
    pub fn arguments(&self, debate_id: &str) -> Result<Vec<DebateArgument>, DomainError> {
        let snapshot = self.snapshot(debate_id)?;
        Ok(snapshot.all_arguments().into_iter().cloned().collect())
    }

    pub fn contains(&self, debate_id: &str) -> bool {
        let debates = match self.debates.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debates.contains_key(debate_id)
    }

    pub fn ids(&self) -> Vec<String> {
        let debates = match self.debates.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debates.keys().cloned().collect()
    }
}

// ==================== DebateStore Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::persona::PersonaConfig;

    fn sample_state() -> DebateState {
        DebateState::new(
            "Should we rewrite the billing service?",
            None,
            vec![
                PersonaConfig::new("optimist", "The Optimist", "finds opportunities"),
                PersonaConfig::new("skeptic", "The Skeptic", "finds risks"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn insert_then_snapshot_round_trips() {
        let store = DebateStore::new();
        let id = store.insert(sample_state());

        let snapshot = store.snapshot(&id).unwrap();
        assert_eq!(snapshot.id.as_str(), id);
        assert_eq!(snapshot.status, DebateStatus::Idle);
        assert!(store.contains(&id));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = DebateStore::new();
        let err = store.snapshot("missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(store.with_mut("missing", |_| ()).unwrap_err().is_not_found());
    }

    #[test]
    fn with_mut_applies_changes() {
        let store = DebateStore::new();
        let id = store.insert(sample_state());

        store.with_mut(&id, |s| s.start()).unwrap().unwrap();
        assert_eq!(store.status(&id).unwrap(), DebateStatus::Debating);
    }
}
