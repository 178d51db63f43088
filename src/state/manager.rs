//! Cycle counter state machine
//!
//! ```text
//! LOAD (schedule start) ──► ADVANCE ──► COMMIT ──┐
//!                             ▲                  │
//!                             └──── next cycle ◄─┘
//! ```
//!
//! A failed read at LOAD starts the counter from zero. A failed COMMIT is
//! logged and the in-memory counter advances anyway, so the counter seen by
//! cycles keeps increasing even while the store is unavailable. Every
//! COMMIT writes the latest in-memory value, which reconciles the store as
//! soon as it accepts writes again.
//!
//! The counter saturates at `u64::MAX`: once there, every cycle reuses that
//! value and logs an error rather than wrapping back to zero.

use super::{Scope, StateMap, StateStore};

/// Key under which the cycle counter is stored
pub const COUNTER_KEY: &str = "FlowFileNumber";

/// Two-tier counter value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleState {
    committed: Option<u64>,
    observed: u64,
}

impl CycleState {
    /// Latest value known to be in the durable store
    pub fn committed(&self) -> Option<u64> {
        self.committed
    }

    /// Latest locally computed value; this is the counter's meaning
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Whether the store holds the latest value
    pub fn is_synced(&self) -> bool {
        self.committed == Some(self.observed)
    }
}

/// Result of advancing the counter for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    /// Counter value for this cycle
    pub number: u64,
    /// Whether the value reached the durable store
    pub committed: bool,
}

/// Owns the counter and the store handle for one schedule
///
/// `advance` takes `&mut self`, so two cycles can never advance the same
/// manager concurrently.
#[derive(Debug)]
pub struct CycleStateManager<S> {
    store: S,
    scope: Scope,
    state: CycleState,
}

impl<S: StateStore> CycleStateManager<S> {
    /// LOAD from the cluster scope
    pub fn load(store: S) -> Self {
        Self::load_with_scope(store, Scope::Cluster)
    }

    /// LOAD from an explicit scope
    pub fn load_with_scope(store: S, scope: Scope) -> Self {
        let committed = match store.get(scope) {
            Ok(map) => match map.get(COUNTER_KEY) {
                None => None,
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(n) => Some(n),
                    Err(_) => {
                        log::warn!(
                            "Failed to read processor state. Stored {} '{}' is not a number, starting from 0",
                            COUNTER_KEY,
                            value
                        );
                        None
                    }
                },
            },
            Err(e) => {
                log::warn!("Failed to read processor state. {}", e);
                None
            }
        };

        let state = CycleState {
            committed,
            observed: committed.unwrap_or(0),
        };
        log::debug!("Loaded {} = {} ({} scope)", COUNTER_KEY, state.observed, scope);

        Self {
            store,
            scope,
            state,
        }
    }

    /// ADVANCE then COMMIT
    ///
    /// Never fails: a commit error only leaves `committed` behind `observed`.
    pub fn advance(&mut self) -> CycleTicket {
        let next = match self.state.observed.checked_add(1) {
            Some(next) => next,
            None => {
                log::error!(
                    "{} is at its maximum value {}, not advancing",
                    COUNTER_KEY,
                    self.state.observed
                );
                self.state.observed
            }
        };

        let mut map = StateMap::new();
        map.insert(COUNTER_KEY.to_string(), next.to_string());

        let committed = match self.store.set(map, self.scope) {
            Ok(()) => {
                self.state.committed = Some(next);
                true
            }
            Err(e) => {
                log::warn!("Failed to save state. {}", e);
                false
            }
        };
        self.state.observed = next;

        CycleTicket {
            number: next,
            committed,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the store handle
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StateError, StateResult};
    use crate::state::MemoryStateStore;
    use std::sync::Mutex;

    /// Store whose reads and writes fail on demand
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStateStore,
        fail_reads: bool,
        fail_writes: Mutex<bool>,
    }

    impl FlakyStore {
        fn set_failing(&self, failing: bool) {
            *self.fail_writes.lock().unwrap() = failing;
        }
    }

    impl StateStore for FlakyStore {
        fn get(&self, scope: Scope) -> StateResult<StateMap> {
            if self.fail_reads {
                return Err(StateError::Read("store unavailable".to_string()));
            }
            self.inner.get(scope)
        }

        fn set(&self, state: StateMap, scope: Scope) -> StateResult<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(StateError::Write("store unavailable".to_string()));
            }
            self.inner.set(state, scope)
        }
    }

    fn stored(store: &impl StateStore) -> Option<String> {
        store.get(Scope::Cluster).unwrap().get(COUNTER_KEY).cloned()
    }

    #[test]
    fn test_fresh_store_starts_at_one() {
        let mut manager = CycleStateManager::load(MemoryStateStore::new());
        assert_eq!(manager.state().observed(), 0);
        assert_eq!(manager.state().committed(), None);

        let ticket = manager.advance();
        assert_eq!(
            ticket,
            CycleTicket {
                number: 1,
                committed: true
            }
        );
        assert!(manager.state().is_synced());
        assert_eq!(stored(manager.store()), Some("1".to_string()));
    }

    #[test]
    fn test_resumes_from_stored_value() {
        let mut state = StateMap::new();
        state.insert(COUNTER_KEY.to_string(), "41".to_string());
        let store = MemoryStateStore::with_state(Scope::Cluster, state);

        let mut manager = CycleStateManager::load(store);
        assert_eq!(manager.state().committed(), Some(41));
        assert_eq!(manager.advance().number, 42);
    }

    #[test]
    fn test_counter_saturates_at_max() {
        let mut state = StateMap::new();
        state.insert(COUNTER_KEY.to_string(), u64::MAX.to_string());
        let store = MemoryStateStore::with_state(Scope::Cluster, state);

        let mut manager = CycleStateManager::load(store);
        let ticket = manager.advance();
        assert_eq!(ticket.number, u64::MAX);
        assert!(ticket.committed);
        assert_eq!(manager.advance().number, u64::MAX);
        assert_eq!(manager.state().observed(), u64::MAX);
        assert_eq!(stored(manager.store()), Some(u64::MAX.to_string()));
    }

    #[test]
    fn test_unreadable_store_starts_at_zero() {
        let store = FlakyStore {
            fail_reads: true,
            ..Default::default()
        };
        let mut manager = CycleStateManager::load(store);
        assert_eq!(manager.state().observed(), 0);
        assert_eq!(manager.advance().number, 1);
    }

    #[test]
    fn test_corrupt_counter_starts_at_zero() {
        let mut state = StateMap::new();
        state.insert(COUNTER_KEY.to_string(), "many".to_string());
        let store = MemoryStateStore::with_state(Scope::Cluster, state);

        let mut manager = CycleStateManager::load(store);
        assert_eq!(manager.advance().number, 1);
    }

    #[test]
    fn test_counter_advances_when_every_commit_after_first_fails() {
        let mut manager = CycleStateManager::load(FlakyStore::default());
        assert!(manager.advance().committed);

        manager.store().set_failing(true);
        for expected in 2..=10 {
            let ticket = manager.advance();
            assert_eq!(ticket.number, expected);
            assert!(!ticket.committed);
        }

        assert_eq!(manager.state().observed(), 10);
        assert_eq!(manager.state().committed(), Some(1));
        assert!(!manager.state().is_synced());
        assert_eq!(stored(manager.store()), Some("1".to_string()));
    }

    #[test]
    fn test_later_commit_reconciles_store() {
        let mut manager = CycleStateManager::load(FlakyStore::default());
        manager.advance();

        manager.store().set_failing(true);
        assert!(!manager.advance().committed);
        assert_eq!(stored(manager.store()), Some("1".to_string()));

        manager.store().set_failing(false);
        let ticket = manager.advance();
        assert_eq!(ticket.number, 3);
        assert!(ticket.committed);
        assert_eq!(stored(manager.store()), Some("3".to_string()));
        assert!(manager.state().is_synced());
    }

    #[test]
    fn test_scope_is_respected() {
        let mut manager = CycleStateManager::load_with_scope(MemoryStateStore::new(), Scope::Local);
        manager.advance();
        assert_eq!(manager.scope(), Scope::Local);
        let store = manager.into_store();
        assert!(store.get(Scope::Cluster).unwrap().is_empty());
        assert_eq!(
            store.get(Scope::Local).unwrap().get(COUNTER_KEY),
            Some(&"1".to_string())
        );
    }
}
