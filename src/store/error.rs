//! Dispatch and build errors.

use crate::actions::{ActionKind, ReduceError};
use crate::checkpoint::CheckpointError;
use crate::core::StateId;
use crate::validation::Rejection;
use thiserror::Error;

/// Why a dispatch was refused. Every variant is detected before anything is
/// mutated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error("Transition from '{from}' to '{to}' is not in the transition table")]
    InvalidTransition { from: StateId, to: StateId },

    #[error("Cannot enter '{target}': missing context fields {missing:?}, failed guards {failed_guards:?}")]
    PreconditionFailed {
        target: StateId,
        missing: Vec<String>,
        failed_guards: Vec<String>,
    },

    #[error("{action} cannot be routed from '{from}': {reason}")]
    UnroutableAction {
        from: StateId,
        action: ActionKind,
        reason: String,
    },

    #[error("Invalid {action} payload: {reason}")]
    InvalidPayload { action: ActionKind, reason: String },

    #[error("History sequence exhausted after {total_recorded} transitions")]
    HistoryExhausted { total_recorded: u64 },
}

impl DispatchError {
    /// Missing context fields, for precondition failures.
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            Self::PreconditionFailed { missing, .. } => Some(missing),
            _ => None,
        }
    }

    /// Names of failed guards, for precondition failures.
    pub fn failed_guards(&self) -> Option<&[String]> {
        match self {
            Self::PreconditionFailed { failed_guards, .. } => Some(failed_guards),
            _ => None,
        }
    }
}

impl From<Rejection> for DispatchError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            Rejection::PreconditionFailed {
                target,
                missing,
                failed_guards,
            } => Self::PreconditionFailed {
                target,
                missing,
                failed_guards,
            },
        }
    }
}

impl From<ReduceError> for DispatchError {
    fn from(error: ReduceError) -> Self {
        match error {
            ReduceError::Unroutable {
                from,
                action,
                reason,
            } => Self::UnroutableAction {
                from,
                action,
                reason,
            },
            ReduceError::InvalidPayload { action, reason } => {
                Self::InvalidPayload { action, reason }
            }
        }
    }
}

/// Errors that can occur when building a state store.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("History capacity must be at least 1")]
    ZeroHistoryCapacity,

    #[error("Observer timeout must be greater than zero")]
    ZeroObserverTimeout,

    #[error("Notification queue must hold at least 1 snapshot")]
    ZeroNotificationQueue,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Cannot restore checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}
