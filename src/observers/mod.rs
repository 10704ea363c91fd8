//! Observers notified after every committed transition.
//!
//! The store only guarantees delivery: every registered observer receives
//! the same post-commit snapshot, and a failing observer never affects the
//! others or the dispatch that triggered the notification.

mod error;
mod registry;

pub use error::{ObserverError, ObserverFailure};
pub use registry::{NotificationReport, ObserverRegistry, DEFAULT_OBSERVER_TIMEOUT};

use crate::core::AIState;
use async_trait::async_trait;

/// Anything that reacts to state changes: feedback collection, anomaly
/// detection, persistence of metrics, ...
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use signflow::core::AIState;
/// use signflow::observers::{Observer, ObserverError};
///
/// struct Printer;
///
/// #[async_trait]
/// impl Observer for Printer {
///     fn name(&self) -> &str {
///         "printer"
///     }
///
///     async fn update(&self, state: &AIState) -> Result<(), ObserverError> {
///         println!("now in {}", state.current_state);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Observer: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn update(&self, state: &AIState) -> Result<(), ObserverError>;
}
