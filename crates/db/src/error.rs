//! Storage error types.

use issuetrack_core::error::CoreError;
use thiserror::Error;

/// Errors returned by [`crate::IssueStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The core rejected the request; nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a domain value.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
