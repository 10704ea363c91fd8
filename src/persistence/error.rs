//! Persistence backend errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A record could not be converted to or from JSON
    #[error("Record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store was built without a backend
    #[error("No persistence backend configured")]
    NotConfigured,

    /// The backend itself failed (I/O, network, ...)
    #[error("Backend failure: {0}")]
    Backend(String),
}
