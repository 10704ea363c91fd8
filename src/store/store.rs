//! The state store: sole owner of the engine state and its only mutation
//! entry point.

use super::builder::StateStoreBuilder;
use super::config::NotificationMode;
use super::error::DispatchError;
use crate::actions::{Action, ActionReducer};
use crate::checkpoint::Checkpoint;
use crate::core::{AIState, StateId, StateTransition};
use crate::observers::{NotificationReport, ObserverRegistry};
use crate::persistence::{
    PersistenceBackend, PersistenceError, CHECKPOINT_NAMESPACE, HISTORY_NAMESPACE,
};
use crate::validation::{TransitionTable, TransitionValidator};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Owns the [`AIState`] and serializes every change to it.
///
/// `dispatch` runs reduce, validate and commit under a single async mutex,
/// so commits form a strict total order and each action is validated against
/// the state left by the previous commit. Observers are notified after the
/// lock is released, or through the store's notifier task in
/// [`NotificationMode::Detached`].
pub struct StateStore {
    state: Mutex<AIState>,
    reducer: ActionReducer,
    validator: TransitionValidator,
    observers: Arc<ObserverRegistry>,
    persistence: Option<Arc<dyn PersistenceBackend>>,
    notification: NotificationMode,
    notification_queue: usize,
    notifier: OnceLock<mpsc::Sender<AIState>>,
}

impl StateStore {
    pub fn builder() -> StateStoreBuilder {
        StateStoreBuilder::new()
    }

    pub(crate) fn from_parts(
        state: AIState,
        table: Arc<TransitionTable>,
        observers: ObserverRegistry,
        persistence: Option<Arc<dyn PersistenceBackend>>,
        notification: NotificationMode,
        notification_queue: usize,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            reducer: ActionReducer::new(Arc::clone(&table)),
            validator: TransitionValidator::new(table),
            observers: Arc::new(observers),
            persistence,
            notification,
            notification_queue,
            notifier: OnceLock::new(),
        }
    }

    /// Apply an action.
    ///
    /// On success the returned snapshot is the committed state, history
    /// included. On failure nothing has changed.
    pub async fn dispatch(&self, action: Action) -> Result<AIState, DispatchError> {
        let (snapshot, evicted, queued) = {
            let mut state = self.state.lock().await;
            match self.commit(&mut state, &action) {
                Ok(evicted) => {
                    let snapshot = state.clone();
                    // Queued under the lock so the notifier sees commit order.
                    let queued = self.enqueue(&snapshot).await;
                    (snapshot, evicted, queued)
                }
                Err(err) => {
                    warn!(
                        action = %action.kind(),
                        state = %state.current_state,
                        error = %err,
                        "dispatch_rejected"
                    );
                    return Err(err);
                }
            }
        };

        if let Some(last) = snapshot.history.last() {
            info!(
                sequence = last.sequence,
                from = %last.from,
                to = %last.to,
                trigger = %last.trigger,
                "transition_committed"
            );
        }
        if let Action::HandleError(payload) = &action {
            error!(
                code = %payload.error_code,
                message = %payload.error_message,
                state = %snapshot.current_state,
                "subsystem_error"
            );
        }

        if let Some(record) = evicted {
            self.archive(record).await;
        }
        if !queued {
            notify_inline(&self.observers, &snapshot).await;
        }

        Ok(snapshot)
    }

    /// Reduce, validate and, if accepted, apply `action` to `state`.
    /// Returns the history record evicted by the commit, if any.
    fn commit(
        &self,
        state: &mut AIState,
        action: &Action,
    ) -> Result<Option<StateTransition>, DispatchError> {
        let from = state.current_state;
        let proposal = self.reducer.reduce(state, action)?;
        debug!(action = %action.kind(), from = %from, to = %proposal.to, "transition_proposed");

        let context = state.context.merged(&proposal.patch);
        self.validator.validate(from, proposal.to, &context)?;

        let record = state
            .history
            .draft(from, proposal.to, action.kind())
            .ok_or(DispatchError::HistoryExhausted {
                total_recorded: state.history.total_recorded(),
            })?;
        state.current_state = proposal.to;
        state.context = context;
        Ok(state.history.record(record))
    }

    /// Hand `snapshot` to the notifier task. Returns `false` when the caller
    /// must notify inline instead.
    async fn enqueue(&self, snapshot: &AIState) -> bool {
        if self.notification != NotificationMode::Detached {
            return false;
        }
        let Some(sender) = self.notifier() else {
            warn!("no tokio runtime for detached notification, notifying inline");
            return false;
        };
        if sender.send(snapshot.clone()).await.is_err() {
            warn!("notifier task is gone, notifying inline");
            return false;
        }
        true
    }

    /// The notifier queue, spawning its task on first use.
    fn notifier(&self) -> Option<&mpsc::Sender<AIState>> {
        if let Some(sender) = self.notifier.get() {
            return Some(sender);
        }
        let handle = Handle::try_current().ok()?;
        Some(self.notifier.get_or_init(|| {
            let (sender, receiver) = mpsc::channel(self.notification_queue);
            handle.spawn(run_notifier(Arc::clone(&self.observers), receiver));
            debug!(queue = self.notification_queue, "notifier_started");
            sender
        }))
    }

    async fn archive(&self, record: StateTransition) {
        let Some(backend) = &self.persistence else {
            debug!(sequence = record.sequence, "history_record_dropped");
            return;
        };
        let sequence = record.sequence;
        let value = match serde_json::to_value(&record) {
            Ok(value) => value,
            Err(err) => {
                warn!(sequence, error = %err, "history_archive_failed");
                return;
            }
        };
        if let Err(err) = backend.persist(HISTORY_NAMESPACE, vec![value]).await {
            warn!(sequence, error = %err, "history_archive_failed");
        }
    }

    /// Owned copy of the current state.
    pub async fn get_state(&self) -> AIState {
        self.state.lock().await.clone()
    }

    pub async fn current_state(&self) -> StateId {
        self.state.lock().await.current_state
    }

    /// Registry used to add or remove observers at runtime.
    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    pub fn table(&self) -> &TransitionTable {
        self.validator.table()
    }

    pub async fn checkpoint(&self) -> Checkpoint {
        Checkpoint::capture(self.get_state().await)
    }

    /// Capture a checkpoint and hand it to the persistence backend.
    pub async fn persist_checkpoint(&self) -> Result<Checkpoint, PersistenceError> {
        let backend = self
            .persistence
            .as_ref()
            .ok_or(PersistenceError::NotConfigured)?;
        let checkpoint = self.checkpoint().await;
        backend
            .persist(CHECKPOINT_NAMESPACE, vec![serde_json::to_value(&checkpoint)?])
            .await?;
        info!(id = %checkpoint.id, "checkpoint_persisted");
        Ok(checkpoint)
    }

    /// Most recent checkpoint written through the persistence backend.
    pub async fn latest_checkpoint(&self) -> Result<Option<Checkpoint>, PersistenceError> {
        let backend = self
            .persistence
            .as_ref()
            .ok_or(PersistenceError::NotConfigured)?;
        let records = backend.load(CHECKPOINT_NAMESPACE).await?;
        match records.into_iter().last() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Records evicted from the in-memory history, oldest first.
    pub async fn archived_history(&self) -> Result<Vec<StateTransition>, PersistenceError> {
        let backend = self
            .persistence
            .as_ref()
            .ok_or(PersistenceError::NotConfigured)?;
        let mut records = backend
            .load(HISTORY_NAMESPACE)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<StateTransition>, _>>()?;
        records.sort_by_key(|record| record.sequence);
        Ok(records)
    }
}

async fn notify_inline(observers: &ObserverRegistry, snapshot: &AIState) {
    let report = observers.notify_all(snapshot).await;
    log_report(snapshot, &report);
}

/// Delivers queued snapshots one at a time until the store is dropped.
async fn run_notifier(observers: Arc<ObserverRegistry>, mut receiver: mpsc::Receiver<AIState>) {
    while let Some(snapshot) = receiver.recv().await {
        notify_inline(&observers, &snapshot).await;
    }
    debug!("notifier_stopped");
}

fn log_report(snapshot: &AIState, report: &NotificationReport) {
    if report.failures.is_empty() {
        debug!(
            state = %snapshot.current_state,
            attempted = report.attempted(),
            "observers_notified"
        );
    } else {
        warn!(
            state = %snapshot.current_state,
            attempted = report.attempted(),
            delivered = report.delivered,
            failed = report.failures.len(),
            "observers_notified_with_failures"
        );
    }
}
