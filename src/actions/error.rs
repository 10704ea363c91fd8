//! Reducer errors.

use super::ActionKind;
use crate::core::StateId;
use thiserror::Error;

/// Reasons a reducer could not produce a candidate transition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReduceError {
    #[error("{action} cannot be routed from '{from}': {reason}")]
    Unroutable {
        from: StateId,
        action: ActionKind,
        reason: String,
    },

    #[error("Invalid {action} payload: {reason}")]
    InvalidPayload { action: ActionKind, reason: String },
}
