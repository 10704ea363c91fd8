//! Checkpoint error types.

use crate::core::StateId;
use thiserror::Error;

/// Errors that can occur when writing, reading or restoring a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint could not be encoded or decoded as JSON
    #[error("Checkpoint JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The current state does not match the last recorded transition
    #[error("Current state '{current}' does not match last recorded target '{last_target}'")]
    StateMismatch { current: StateId, last_target: StateId },

    /// A recorded transition is not allowed by the transition table
    #[error("Recorded transition #{sequence} from '{from}' to '{to}' is not in the transition table")]
    TransitionNotInTable {
        sequence: u64,
        from: StateId,
        to: StateId,
    },

    /// More records are retained than the history capacity allows
    #[error("History retains {retained} records but its capacity is {capacity}")]
    OverCapacity { retained: usize, capacity: usize },

    /// Recorded transitions do not chain or are not numbered consecutively
    #[error("History is broken at transition #{sequence}: {reason}")]
    BrokenHistory { sequence: u64, reason: String },
}
