//! State transition history tracking.
//!
//! The history is an append-only, time-monotonic log of committed
//! transitions, kept in a bounded ring buffer. Records pushed out of the
//! buffer are handed back to the caller so they can be archived.

use super::state::StateId;
use crate::actions::ActionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default number of transitions retained in memory.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Record of a single committed transition.
///
/// Transitions are immutable audit values. `sequence` numbers start at 1 and
/// increase by one per commit, including records that were later evicted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Commit number, strictly increasing
    pub sequence: u64,
    /// The state being transitioned from
    pub from: StateId,
    /// The state being transitioned to
    pub to: StateId,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
    /// Kind of action that caused the transition
    pub trigger: ActionKind,
}

/// Ordered history of committed transitions with bounded retention.
///
/// # Example
///
/// ```rust
/// use signflow::actions::ActionKind;
/// use signflow::core::{HistoryLog, StateId};
///
/// let mut history = HistoryLog::default();
///
/// let first = history.draft(StateId::Linguistes, StateId::AvatarSourd, ActionKind::ProcessSignInput).unwrap();
/// history.record(first);
///
/// let second = history.draft(StateId::AvatarSourd, StateId::SystemeExpressions, ActionKind::UpdateExpression).unwrap();
/// history.record(second);
///
/// let path = history.path();
/// assert_eq!(path, vec![StateId::Linguistes, StateId::AvatarSourd, StateId::SystemeExpressions]);
/// assert_eq!(history.total_recorded(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    capacity: NonZeroUsize,
    total_recorded: u64,
    transitions: VecDeque<StateTransition>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_HISTORY_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(capacity)
    }
}

impl HistoryLog {
    /// Create an empty history retaining at most `capacity` records.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            total_recorded: 0,
            transitions: VecDeque::new(),
        }
    }

    /// Build the record that would be appended next, without appending it.
    ///
    /// The timestamp never goes backwards relative to the last record, even
    /// if the wall clock does. Returns `None` once the sequence space is
    /// exhausted.
    pub fn draft(&self, from: StateId, to: StateId, trigger: ActionKind) -> Option<StateTransition> {
        let sequence = self.total_recorded.checked_add(1)?;
        let now = Utc::now();
        let timestamp = match self.transitions.back() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        Some(StateTransition {
            sequence,
            from,
            to,
            timestamp,
            trigger,
        })
    }

    /// Append a record, returning the oldest record if it was evicted.
    pub fn record(&mut self, transition: StateTransition) -> Option<StateTransition> {
        self.total_recorded = transition.sequence.max(self.total_recorded.saturating_add(1));
        self.transitions.push_back(transition);
        if self.transitions.len() > self.capacity.get() {
            self.transitions.pop_front()
        } else {
            None
        }
    }

    /// Get the path of states traversed by the retained records.
    ///
    /// Returns the origin of the oldest retained record, then the target of
    /// each record in order.
    pub fn path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> std::collections::vec_deque::Iter<'_, StateTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of records ever appended, evicted ones included.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}
