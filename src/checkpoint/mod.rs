//! Checkpoint and restore of the orchestration state.
//!
//! A checkpoint is a versioned, timestamped copy of an [`AIState`]. It is
//! validated against the transition table before a store is rebuilt from
//! it, so a tampered or stale checkpoint cannot put the engine in a state
//! it could never have reached.

use crate::core::{AIState, StateTransition};
use crate::validation::TransitionTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of the engine state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// State at capture time, history included
    pub snapshot: AIState,
}

impl Checkpoint {
    pub fn capture(snapshot: AIState) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            snapshot,
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a checkpoint, refusing versions this build does not know.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Checkpoint = serde_json::from_str(json)?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(checkpoint)
    }

    /// Check that the recorded history fits its capacity, is consecutive,
    /// chains from record to record, only uses transitions the table allows,
    /// and ends in the current state.
    pub fn validate(&self, table: &TransitionTable) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let history = &self.snapshot.history;
        if history.len() > history.capacity() {
            return Err(CheckpointError::OverCapacity {
                retained: history.len(),
                capacity: history.capacity(),
            });
        }

        let mut previous: Option<&StateTransition> = None;
        for record in history.transitions() {
            if !table.allows(record.from, record.to) {
                return Err(CheckpointError::TransitionNotInTable {
                    sequence: record.sequence,
                    from: record.from,
                    to: record.to,
                });
            }
            if let Some(prev) = previous {
                let expected = prev.sequence.checked_add(1);
                if expected != Some(record.sequence) {
                    let reason = match expected {
                        Some(expected) => format!("expected sequence {expected}"),
                        None => "sequence overflows".to_string(),
                    };
                    return Err(CheckpointError::BrokenHistory {
                        sequence: record.sequence,
                        reason,
                    });
                }
                if record.from != prev.to {
                    return Err(CheckpointError::BrokenHistory {
                        sequence: record.sequence,
                        reason: format!("starts in '{}' but previous ended in '{}'", record.from, prev.to),
                    });
                }
                if record.timestamp < prev.timestamp {
                    return Err(CheckpointError::BrokenHistory {
                        sequence: record.sequence,
                        reason: "timestamp goes backwards".to_string(),
                    });
                }
            }
            previous = Some(record);
        }

        if history.total_recorded() == u64::MAX {
            return Err(CheckpointError::BrokenHistory {
                sequence: history.total_recorded(),
                reason: "no sequence numbers left".to_string(),
            });
        }

        let Some(last) = history.last() else {
            if history.total_recorded() > 0 {
                return Err(CheckpointError::BrokenHistory {
                    sequence: history.total_recorded(),
                    reason: "records were counted but none are retained".to_string(),
                });
            }
            return Ok(());
        };
        if last.sequence != history.total_recorded() {
            return Err(CheckpointError::BrokenHistory {
                sequence: last.sequence,
                reason: format!("total recorded is {}", history.total_recorded()),
            });
        }
        if last.to != self.snapshot.current_state {
            return Err(CheckpointError::StateMismatch {
                current: self.snapshot.current_state,
                last_target: last.to,
            });
        }

        Ok(())
    }
}
