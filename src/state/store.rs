//! Durable state store contract

use crate::error::StateResult;
use std::collections::BTreeMap;
use std::fmt;

/// Small string-to-string mapping held by a state store
pub type StateMap = BTreeMap<String, String>;

/// Visibility of stored state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Shared by every node of a deployment
    Cluster,
    /// Private to the current node
    Local,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Get/set access to a durable key-value mapping
///
/// Consistency is best effort, last write wins. Failures are reported as
/// [`crate::error::StateError`] and are always recoverable for the caller.
pub trait StateStore: Send + Sync {
    /// Read the whole mapping for a scope. A scope never written reads as empty.
    fn get(&self, scope: Scope) -> StateResult<StateMap>;

    /// Replace the whole mapping for a scope
    fn set(&self, state: StateMap, scope: Scope) -> StateResult<()>;

    /// Remove everything stored for a scope
    fn clear(&self, scope: Scope) -> StateResult<()> {
        self.set(StateMap::new(), scope)
    }
}

impl<T: StateStore> StateStore for &T {
    fn get(&self, scope: Scope) -> StateResult<StateMap> {
        (**self).get(scope)
    }

    fn set(&self, state: StateMap, scope: Scope) -> StateResult<()> {
        (**self).set(state, scope)
    }
}
