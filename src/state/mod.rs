//! Cross-cycle state
//!
//! This module handles the durable cycle counter:
//! - The [`StateStore`] contract and its scopes
//! - File and in-memory store implementations
//! - The [`CycleStateManager`] load/advance/commit state machine

mod file;
mod manager;
mod memory;
mod store;

pub use file::FileStateStore;
pub use manager::{COUNTER_KEY, CycleState, CycleStateManager, CycleTicket};
pub use memory::MemoryStateStore;
pub use store::{Scope, StateMap, StateStore};
