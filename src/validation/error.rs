//! Validator rejections.

use crate::core::StateId;
use thiserror::Error;

/// Why the validator refused a proposed transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Transition from '{from}' to '{to}' is not in the transition table")]
    InvalidTransition { from: StateId, to: StateId },

    #[error("Cannot enter '{target}': missing context fields {missing:?}, failed guards {failed_guards:?}")]
    PreconditionFailed {
        target: StateId,
        missing: Vec<String>,
        failed_guards: Vec<String>,
    },
}
