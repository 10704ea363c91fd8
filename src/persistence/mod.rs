//! Injected persistence for history archival and checkpoints.
//!
//! The engine never touches storage directly; it hands JSON records to a
//! [`PersistenceBackend`] under a namespace and reads them back the same
//! way.

mod error;

pub use error::PersistenceError;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Namespace receiving history records evicted from the in-memory buffer.
pub const HISTORY_NAMESPACE: &str = "history";

/// Namespace receiving checkpoints.
pub const CHECKPOINT_NAMESPACE: &str = "checkpoints";

/// Storage collaborator. `persist` appends, `load` returns everything
/// appended so far in append order.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn persist(&self, namespace: &str, records: Vec<Value>) -> Result<(), PersistenceError>;

    async fn load(&self, namespace: &str) -> Result<Vec<Value>, PersistenceError>;
}

/// In-memory backend backed by a `HashMap` behind a `RwLock`.
///
/// Suitable for tests and single-process use where nothing has to survive a
/// restart.
#[derive(Default)]
pub struct MemoryPersistence {
    namespaces: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryPersistence {
    async fn persist(&self, namespace: &str, records: Vec<Value>) -> Result<(), PersistenceError> {
        let mut namespaces = self.namespaces.write().await;
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .extend(records);
        Ok(())
    }

    async fn load(&self, namespace: &str) -> Result<Vec<Value>, PersistenceError> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces.get(namespace).cloned().unwrap_or_default())
    }
}
