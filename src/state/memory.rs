//! In-memory state store

use super::{Scope, StateMap, StateStore};
use crate::error::{StateError, StateResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// State store that lives only as long as the process
///
/// Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    scopes: Mutex<HashMap<Scope, StateMap>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated for one scope
    pub fn with_state(scope: Scope, state: StateMap) -> Self {
        let store = Self::new();
        if let Ok(mut scopes) = store.scopes.lock() {
            scopes.insert(scope, state);
        }
        store
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, scope: Scope) -> StateResult<StateMap> {
        let scopes = self
            .scopes
            .lock()
            .map_err(|_| StateError::Read("state lock poisoned".to_string()))?;
        Ok(scopes.get(&scope).cloned().unwrap_or_default())
    }

    fn set(&self, state: StateMap, scope: Scope) -> StateResult<()> {
        let mut scopes = self
            .scopes
            .lock()
            .map_err(|_| StateError::Write("state lock poisoned".to_string()))?;
        scopes.insert(scope, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_are_independent() {
        let store = MemoryStateStore::new();
        let mut state = StateMap::new();
        state.insert("k".to_string(), "v".to_string());
        store.set(state.clone(), Scope::Cluster).unwrap();

        assert_eq!(store.get(Scope::Cluster).unwrap(), state);
        assert!(store.get(Scope::Local).unwrap().is_empty());

        store.clear(Scope::Cluster).unwrap();
        assert!(store.get(Scope::Cluster).unwrap().is_empty());
    }
}
