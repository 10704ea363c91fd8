//! The orchestration state as seen by callers and observers.

use super::context::StateContext;
use super::history::HistoryLog;
use super::state::StateId;
use serde::{Deserialize, Serialize};

/// Complete engine state: authoritative subsystem, its context, and the
/// transitions that led here.
///
/// Values handed out by the store are owned clones; mutating one never
/// reaches the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIState {
    pub current_state: StateId,
    pub context: StateContext,
    pub history: HistoryLog,
}

impl AIState {
    /// Fresh state with empty context and the given history buffer.
    pub fn new(initial: StateId, history: HistoryLog) -> Self {
        Self {
            current_state: initial,
            context: StateContext::new(),
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_state_is_empty() {
        let state = AIState::new(StateId::ValidationInitiale, HistoryLog::default());
        assert_eq!(state.current_state, StateId::ValidationInitiale);
        assert!(state.context.is_empty());
        assert!(state.history.is_empty());
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let state = AIState::new(StateId::Linguistes, HistoryLog::default());
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["currentState"], json!("Linguistes"));
        assert_eq!(value["context"], json!({}));
    }
}
