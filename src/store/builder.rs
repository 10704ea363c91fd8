//! Builder for constructing state stores.

use super::config::OrchestratorConfig;
use super::error::BuildError;
use super::store::StateStore;
use crate::checkpoint::Checkpoint;
use crate::core::{AIState, HistoryLog, StateId};
use crate::observers::{Observer, ObserverRegistry};
use crate::persistence::PersistenceBackend;
use crate::validation::TransitionTable;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::info;

/// Builder for constructing a [`StateStore`] with a fluent API.
///
/// ```rust
/// use signflow::core::StateId;
/// use signflow::store::StateStore;
///
/// let store = StateStore::builder()
///     .initial(StateId::Linguistes)
///     .build()
///     .unwrap();
/// ```
pub struct StateStoreBuilder {
    config: OrchestratorConfig,
    initial: Option<StateId>,
    table: Option<TransitionTable>,
    observers: Vec<Arc<dyn Observer>>,
    persistence: Option<Arc<dyn PersistenceBackend>>,
    checkpoint: Option<Checkpoint>,
}

impl StateStoreBuilder {
    /// Create a new builder with default configuration and the standard
    /// transition table.
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            initial: None,
            table: None,
            observers: Vec::new(),
            persistence: None,
            checkpoint: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the configured initial state.
    pub fn initial(mut self, state: StateId) -> Self {
        self.initial = Some(state);
        self
    }

    /// Use a custom transition table instead of [`TransitionTable::standard`].
    pub fn table(mut self, table: TransitionTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Register an observer from the start.
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn persistence(mut self, backend: Arc<dyn PersistenceBackend>) -> Self {
        self.persistence = Some(backend);
        self
    }

    /// Start from a checkpoint instead of a fresh state. The checkpoint's
    /// history, including its capacity, is kept as is.
    pub fn restore(mut self, checkpoint: Checkpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Build the store.
    /// Returns an error if the configuration is unusable or the checkpoint
    /// does not validate against the table.
    pub fn build(self) -> Result<StateStore, BuildError> {
        let capacity = NonZeroUsize::new(self.config.history_capacity)
            .ok_or(BuildError::ZeroHistoryCapacity)?;
        let timeout = self.config.observer_timeout();
        if timeout.is_zero() {
            return Err(BuildError::ZeroObserverTimeout);
        }
        if self.config.notification_queue == 0 {
            return Err(BuildError::ZeroNotificationQueue);
        }

        let table = Arc::new(self.table.unwrap_or_else(TransitionTable::standard));

        let state = match self.checkpoint {
            Some(checkpoint) => {
                checkpoint.validate(&table)?;
                info!(
                    id = %checkpoint.id,
                    state = %checkpoint.snapshot.current_state,
                    "checkpoint_restored"
                );
                checkpoint.snapshot
            }
            None => {
                let initial = self.initial.unwrap_or(self.config.initial_state);
                AIState::new(initial, HistoryLog::with_capacity(capacity))
            }
        };

        Ok(StateStore::from_parts(
            state,
            table,
            ObserverRegistry::with_observers(timeout, self.observers),
            self.persistence,
            self.config.notification,
            self.config.notification_queue,
        ))
    }
}

impl Default for StateStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use crate::checkpoint::CheckpointError;

    #[tokio::test]
    async fn builder_uses_configured_initial_state() {
        let store = StateStoreBuilder::new().build().unwrap();
        assert_eq!(store.current_state().await, StateId::ValidationInitiale);

        let store = StateStoreBuilder::new()
            .config(OrchestratorConfig {
                initial_state: StateId::Spectatrices,
                ..OrchestratorConfig::default()
            })
            .build()
            .unwrap();
        assert_eq!(store.current_state().await, StateId::Spectatrices);
    }

    #[tokio::test]
    async fn initial_overrides_config() {
        let store = StateStoreBuilder::new()
            .initial(StateId::AvatarEntendant)
            .build()
            .unwrap();
        assert_eq!(store.current_state().await, StateId::AvatarEntendant);
    }

    #[test]
    fn builder_rejects_zero_capacity() {
        let result = StateStoreBuilder::new()
            .config(OrchestratorConfig {
                history_capacity: 0,
                ..OrchestratorConfig::default()
            })
            .build();
        assert!(matches!(result, Err(BuildError::ZeroHistoryCapacity)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let result = StateStoreBuilder::new()
            .config(OrchestratorConfig {
                observer_timeout_ms: 0,
                ..OrchestratorConfig::default()
            })
            .build();
        assert!(matches!(result, Err(BuildError::ZeroObserverTimeout)));
    }

    #[test]
    fn builder_rejects_zero_notification_queue() {
        let result = StateStoreBuilder::new()
            .config(OrchestratorConfig {
                notification_queue: 0,
                ..OrchestratorConfig::default()
            })
            .build();
        assert!(matches!(result, Err(BuildError::ZeroNotificationQueue)));
    }

    /// Checkpoint of a store that went Linguistes -> AvatarSourd -> AvatarSourd
    /// -> AvatarSourd, with its JSON history edited by `edit`.
    fn edited_checkpoint(edit: impl FnOnce(&mut serde_json::Value)) -> Checkpoint {
        let mut history = HistoryLog::default();
        for (from, to) in [
            (StateId::Linguistes, StateId::AvatarSourd),
            (StateId::AvatarSourd, StateId::AvatarSourd),
            (StateId::AvatarSourd, StateId::AvatarSourd),
        ] {
            let record = history.draft(from, to, ActionKind::UpdateEmotion).unwrap();
            history.record(record);
        }
        let checkpoint = Checkpoint::capture(AIState {
            current_state: StateId::AvatarSourd,
            context: Default::default(),
            history,
        });

        let mut json = serde_json::to_value(&checkpoint).unwrap();
        edit(&mut json["snapshot"]["history"]);
        Checkpoint::from_json(&json.to_string()).unwrap()
    }

    #[test]
    fn builder_refuses_checkpoint_over_capacity() {
        let checkpoint = edited_checkpoint(|history| history["capacity"] = 1.into());

        let result = StateStoreBuilder::new().restore(checkpoint).build();
        assert!(matches!(
            result,
            Err(BuildError::Checkpoint(CheckpointError::OverCapacity {
                retained: 3,
                capacity: 1,
            }))
        ));
    }

    #[test]
    fn builder_refuses_checkpoint_with_exhausted_sequence() {
        let checkpoint = edited_checkpoint(|history| {
            history["total_recorded"] = u64::MAX.into();
            history["transitions"][0]["sequence"] = (u64::MAX - 2).into();
            history["transitions"][1]["sequence"] = (u64::MAX - 1).into();
            history["transitions"][2]["sequence"] = u64::MAX.into();
        });

        let result = StateStoreBuilder::new().restore(checkpoint).build();
        assert!(matches!(
            result,
            Err(BuildError::Checkpoint(CheckpointError::BrokenHistory { .. }))
        ));
    }

    #[test]
    fn builder_rejects_invalid_checkpoint() {
        let mut history = HistoryLog::default();
        let record = history
            .draft(
                StateId::ValidationInitiale,
                StateId::AvatarSourd,
                ActionKind::ProcessSignInput,
            )
            .unwrap();
        history.record(record);
        let checkpoint = Checkpoint::capture(AIState {
            current_state: StateId::AvatarSourd,
            context: Default::default(),
            history,
        });

        let result = StateStoreBuilder::new().restore(checkpoint).build();
        assert!(matches!(
            result,
            Err(BuildError::Checkpoint(CheckpointError::TransitionNotInTable { .. }))
        ));
    }

    #[tokio::test]
    async fn custom_table_is_used() {
        let table = TransitionTable::new().allow(StateId::Linguistes, [StateId::Spectatrices]);
        let store = StateStoreBuilder::new()
            .initial(StateId::Linguistes)
            .table(table)
            .build()
            .unwrap();

        assert!(store.table().allows(StateId::Linguistes, StateId::Spectatrices));
        assert!(!store.table().allows(StateId::Linguistes, StateId::AvatarSourd));
    }
}
