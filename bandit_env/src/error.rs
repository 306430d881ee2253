//! Error types for the bandit environment abstraction.

use thiserror::Error;

/// Errors raised at the snapshot sink boundary.
///
/// These never cross back into the trial loop as failures; the driver logs
/// and counts them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The consumer is behind and the channel buffer is full.
    #[error("Snapshot channel full")]
    Full,
    
    /// The consumer has gone away.
    #[error("Snapshot channel closed")]
    Closed,
    
    /// A custom sink refused the snapshot.
    #[error("Snapshot rejected: {0}")]
    Rejected(String),
}

impl SinkError {
    /// Creates a rejection error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}
