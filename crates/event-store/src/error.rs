use common::ContextError;
use thiserror::Error;

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The operation context was cancelled or expired.
    #[error("Event store operation aborted: {0}")]
    Cancelled(#[from] ContextError),

    /// The storage backend rejected or failed the operation.
    #[error("Event store backend error: {reason}")]
    Backend { reason: String },
}

impl EventStoreError {
    /// Creates a backend error from any displayable reason.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
