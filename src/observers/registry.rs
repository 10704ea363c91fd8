//! Observer registry and fan-out.

use super::error::{ObserverError, ObserverFailure};
use super::Observer;
use crate::core::AIState;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How long a single observer may take before its delivery is abandoned.
pub const DEFAULT_OBSERVER_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationReport {
    pub delivered: usize,
    pub failures: Vec<ObserverFailure>,
}

impl NotificationReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

/// Set of observers, keyed by `Arc` identity, kept in registration order.
///
/// The set is copied before each fan-out, so registering or unregistering
/// while a notification is in flight only affects later notifications.
pub struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn Observer>>>,
    timeout: Duration,
}

impl ObserverRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self::with_observers(timeout, Vec::new())
    }

    /// Registry pre-populated with `observers`; duplicates are dropped.
    pub fn with_observers(timeout: Duration, observers: Vec<Arc<dyn Observer>>) -> Self {
        let mut unique: Vec<Arc<dyn Observer>> = Vec::with_capacity(observers.len());
        for observer in observers {
            if !unique.iter().any(|existing| same_observer(existing, &observer)) {
                unique.push(observer);
            }
        }
        Self {
            observers: RwLock::new(unique),
            timeout,
        }
    }

    /// Per-observer delivery bound. Enforced only when the fan-out runs
    /// inside a tokio runtime with timers enabled.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Add an observer. Returns `false` if this exact observer is already
    /// registered.
    pub async fn register(&self, observer: Arc<dyn Observer>) -> bool {
        let mut observers = self.observers.write().await;
        if observers.iter().any(|existing| same_observer(existing, &observer)) {
            return false;
        }
        debug!(observer = observer.name(), "observer_registered");
        observers.push(observer);
        true
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub async fn unregister(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut observers = self.observers.write().await;
        let before = observers.len();
        observers.retain(|existing| !same_observer(existing, observer));
        let removed = observers.len() != before;
        if removed {
            debug!(observer = observer.name(), "observer_unregistered");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.observers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.observers.read().await.is_empty()
    }

    /// Deliver `state` to every registered observer concurrently.
    ///
    /// Completes once each delivery has finished, failed, panicked or timed
    /// out. Never fails. Outside a tokio runtime deliveries still run, but
    /// without the timeout.
    pub async fn notify_all(&self, state: &AIState) -> NotificationReport {
        let observers: Vec<Arc<dyn Observer>> = self.observers.read().await.clone();
        if observers.is_empty() {
            return NotificationReport::default();
        }

        let deliveries = observers
            .iter()
            .map(|observer| self.deliver(observer.as_ref(), state));
        let outcomes = join_all(deliveries).await;

        let mut report = NotificationReport::default();
        for (observer, outcome) in observers.iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(
                        observer = observer.name(),
                        state = %state.current_state,
                        error = %error,
                        "observer_failed"
                    );
                    report.failures.push(ObserverFailure {
                        observer: observer.name().to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    async fn deliver(&self, observer: &dyn Observer, state: &AIState) -> Result<(), ObserverError> {
        let update = AssertUnwindSafe(observer.update(state)).catch_unwind();
        // The timer needs a tokio runtime; without one the update is unbounded.
        let outcome = if Handle::try_current().is_ok() {
            match tokio::time::timeout(self.timeout, update).await {
                Ok(outcome) => outcome,
                Err(_elapsed) => {
                    return Err(ObserverError::TimedOut {
                        timeout: self.timeout,
                    })
                }
            }
        } else {
            update.await
        };
        match outcome {
            Ok(result) => result,
            Err(panic) => Err(ObserverError::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_OBSERVER_TIMEOUT)
    }
}

fn same_observer(a: &Arc<dyn Observer>, b: &Arc<dyn Observer>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HistoryLog, StateId};
    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<StateId>>,
    }

    #[async_trait]
    impl Observer for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn update(&self, state: &AIState) -> Result<(), ObserverError> {
            self.seen.lock().await.push(state.current_state);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Observer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn update(&self, _state: &AIState) -> Result<(), ObserverError> {
            Err(ObserverError::Failed("feedback backend unavailable".to_string()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Observer for Panicking {
        async fn update(&self, _state: &AIState) -> Result<(), ObserverError> {
            panic!("anomaly detector exploded");
        }
    }

    struct Stalled;

    #[async_trait]
    impl Observer for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn update(&self, _state: &AIState) -> Result<(), ObserverError> {
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    /// Blocks inside `update` until released.
    #[derive(Default)]
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Observer for Gate {
        fn name(&self) -> &str {
            "gate"
        }

        async fn update(&self, _state: &AIState) -> Result<(), ObserverError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    fn snapshot(current: StateId) -> AIState {
        AIState::new(current, HistoryLog::default())
    }

    #[tokio::test]
    async fn register_rejects_duplicate_identity() {
        let registry = ObserverRegistry::default();
        let recorder: Arc<dyn Observer> = Arc::new(Recorder::default());

        assert!(registry.register(Arc::clone(&recorder)).await);
        assert!(!registry.register(Arc::clone(&recorder)).await);
        assert!(registry.register(Arc::new(Recorder::default())).await);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn unregister_removes_only_that_observer() {
        let registry = ObserverRegistry::default();
        let first: Arc<dyn Observer> = Arc::new(Recorder::default());
        let second: Arc<dyn Observer> = Arc::new(Recorder::default());
        registry.register(Arc::clone(&first)).await;
        registry.register(Arc::clone(&second)).await;

        assert!(registry.unregister(&first).await);
        assert!(!registry.unregister(&first).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn with_observers_drops_duplicates() {
        let recorder: Arc<dyn Observer> = Arc::new(Recorder::default());
        let registry = ObserverRegistry::with_observers(
            DEFAULT_OBSERVER_TIMEOUT,
            vec![Arc::clone(&recorder), recorder],
        );
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn notify_all_delivers_identical_snapshot() {
        let registry = ObserverRegistry::default();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        registry.register(first.clone()).await;
        registry.register(second.clone()).await;

        let report = registry.notify_all(&snapshot(StateId::AvatarSourd)).await;

        assert_eq!(report.delivered, 2);
        assert!(report.failures.is_empty());
        assert_eq!(*first.seen.lock().await, vec![StateId::AvatarSourd]);
        assert_eq!(*second.seen.lock().await, vec![StateId::AvatarSourd]);
    }

    #[tokio::test]
    async fn failing_observer_does_not_block_others() {
        let registry = ObserverRegistry::default();
        let before = Arc::new(Recorder::default());
        let after = Arc::new(Recorder::default());
        registry.register(before.clone()).await;
        registry.register(Arc::new(Failing)).await;
        registry.register(after.clone()).await;

        let report = registry.notify_all(&snapshot(StateId::Linguistes)).await;

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].observer, "failing");
        assert_eq!(before.seen.lock().await.len(), 1);
        assert_eq!(after.seen.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn panicking_observer_is_contained() {
        let registry = ObserverRegistry::default();
        let recorder = Arc::new(Recorder::default());
        registry.register(Arc::new(Panicking)).await;
        registry.register(recorder.clone()).await;

        let report = registry.notify_all(&snapshot(StateId::Linguistes)).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(
            report.failures[0].error,
            ObserverError::Panicked("anomaly detector exploded".to_string())
        );
        assert_eq!(recorder.seen.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn stalled_observer_times_out() {
        let timeout = Duration::from_millis(20);
        let registry = ObserverRegistry::new(timeout);
        let recorder = Arc::new(Recorder::default());
        registry.register(Arc::new(Stalled)).await;
        registry.register(recorder.clone()).await;

        let report = registry.notify_all(&snapshot(StateId::Linguistes)).await;

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.failures[0].error, ObserverError::TimedOut { timeout });
        assert_eq!(recorder.seen.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_registry_reports_nothing() {
        let registry = ObserverRegistry::default();
        let report = registry.notify_all(&snapshot(StateId::Linguistes)).await;
        assert_eq!(report, NotificationReport::default());
    }

    #[tokio::test]
    async fn membership_changes_leave_inflight_fan_out_alone() {
        let registry = Arc::new(ObserverRegistry::default());
        let gate = Arc::new(Gate::default());
        let leaving = Arc::new(Recorder::default());
        let leaving_handle: Arc<dyn Observer> = leaving.clone();
        registry.register(gate.clone()).await;
        registry.register(Arc::clone(&leaving_handle)).await;

        let inflight = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.notify_all(&snapshot(StateId::AvatarSourd)).await })
        };
        gate.entered.notified().await;

        let joining = Arc::new(Recorder::default());
        assert!(registry.register(joining.clone()).await);
        assert!(registry.unregister(&leaving_handle).await);
        gate.release.notify_one();

        let report = inflight.await.unwrap();
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.delivered, 2);
        assert_eq!(*leaving.seen.lock().await, vec![StateId::AvatarSourd]);
        assert!(joining.seen.lock().await.is_empty());

        gate.release.notify_one();
        let report = registry.notify_all(&snapshot(StateId::Spectatrices)).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(*joining.seen.lock().await, vec![StateId::Spectatrices]);
        assert_eq!(leaving.seen.lock().await.len(), 1);
    }

    #[test]
    fn notify_all_runs_without_tokio_runtime() {
        let registry = ObserverRegistry::default();
        let recorder = Arc::new(Recorder::default());

        futures::executor::block_on(async {
            registry.register(recorder.clone()).await;
            registry.register(Arc::new(Failing)).await;
            registry.register(Arc::new(Panicking)).await;

            let report = registry.notify_all(&snapshot(StateId::Linguistes)).await;

            assert_eq!(report.delivered, 1);
            assert_eq!(report.failures.len(), 2);
            assert_eq!(*recorder.seen.lock().await, vec![StateId::Linguistes]);
        });
    }
}
