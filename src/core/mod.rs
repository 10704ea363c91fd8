//! Core orchestration types.
//!
//! This module contains the pure data of the engine:
//! - Subsystem identifiers via [`StateId`]
//! - Shallow-merged [`StateContext`]
//! - Bounded transition history
//!
//! Nothing in here performs I/O or holds locks.

mod context;
mod history;
mod snapshot;
mod state;

pub use context::{fields, StateContext};
pub use history::{HistoryLog, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use snapshot::AIState;
pub use state::StateId;
