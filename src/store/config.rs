//! Store configuration.

use super::error::BuildError;
use crate::core::{StateId, DEFAULT_HISTORY_CAPACITY};
use crate::observers::DEFAULT_OBSERVER_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How observers are notified after a commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    /// `dispatch` returns once every observer finished or timed out.
    #[default]
    Await,
    /// Snapshots are queued, in commit order, to a single notifier task
    /// that the store spawns on first use; `dispatch` returns once its
    /// snapshot is queued. The queue is bounded by
    /// [`OrchestratorConfig::notification_queue`]: when it is full, the next
    /// commit waits for room while still holding the state lock, so an
    /// observer must not dispatch into the same store. Without a tokio
    /// runtime the store falls back to notifying inline.
    Detached,
}

/// Default capacity of the detached notification queue.
pub const DEFAULT_NOTIFICATION_QUEUE: usize = 64;

/// Tunables for a [`StateStore`](super::StateStore).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use signflow::core::StateId;
/// use signflow::store::{NotificationMode, OrchestratorConfig};
///
/// let config = OrchestratorConfig::from_json(r#"{"initial_state": "Linguistes", "history_capacity": 64}"#).unwrap();
/// assert_eq!(config.initial_state, StateId::Linguistes);
/// assert_eq!(config.history_capacity, 64);
/// assert_eq!(config.notification, NotificationMode::Await);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub initial_state: StateId,
    pub history_capacity: usize,
    pub observer_timeout_ms: u64,
    pub notification: NotificationMode,
    /// Snapshots waiting for the detached notifier; must be at least 1.
    pub notification_queue: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            initial_state: StateId::ValidationInitiale,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            observer_timeout_ms: DEFAULT_OBSERVER_TIMEOUT.as_millis() as u64,
            notification: NotificationMode::default(),
            notification_queue: DEFAULT_NOTIFICATION_QUEUE,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn observer_timeout(&self) -> Duration {
        Duration::from_millis(self.observer_timeout_ms)
    }
}
