//! Error types for the heal pipeline

use dom_snapshot::SnapshotError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HealError {
    /// Baseline or current snapshot could not be turned into a tree
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Invalid heal options
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A pipeline stage panicked
    #[error("pipeline panicked: {0}")]
    Panicked(String),
}

impl HealError {
    /// Same inputs always reproduce the same failure.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            HealError::Panicked(_) => 3,
            HealError::Snapshot(_) => 2,
            HealError::InvalidOptions(_) => 1,
        }
    }
}
