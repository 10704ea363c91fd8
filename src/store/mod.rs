//! The state store and its construction.

mod builder;
mod config;
mod error;
#[allow(clippy::module_inception)]
mod store;

pub use builder::StateStoreBuilder;
pub use config::{NotificationMode, OrchestratorConfig, DEFAULT_NOTIFICATION_QUEUE};
pub use error::{BuildError, DispatchError};
pub use store::StateStore;
