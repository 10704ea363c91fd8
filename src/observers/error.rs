//! Observer failures. None of these ever reach a dispatch caller.

use std::time::Duration;
use thiserror::Error;

/// Why a single observer did not take delivery of a snapshot.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ObserverError {
    #[error("Observer update failed: {0}")]
    Failed(String),

    #[error("Observer did not finish within {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("Observer panicked: {0}")]
    Panicked(String),
}

/// One observer's failure during a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverFailure {
    pub observer: String,
    pub error: ObserverError,
}
