//! Error types for the sync engine.

use crate::remote::RemoteError;
use pinsync_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during engine operations.
///
/// Mutating calls (`add`/`remove`/`toggle`) can only fail with
/// [`SyncError::LimitExceeded`], [`SyncError::Store`], or
/// [`SyncError::Codec`] - remote failures are absorbed into the pending
/// log, not surfaced. `sync()` additionally surfaces remote failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The active plan's bookmark limit would be exceeded.
    #[error("bookmark limit reached: {limit}")]
    LimitExceeded {
        /// The limit the active plan enforces.
        limit: usize,
    },

    /// Local storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A persisted blob could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// Remote call failed during a sync cycle.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A sync cycle is already in flight for this session.
    #[error("sync already in progress")]
    SyncInProgress,
}

impl SyncError {
    /// Returns true if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote(err) => err.is_retryable(),
            SyncError::SyncInProgress => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::Remote(RemoteError::Timeout).is_retryable());
        assert!(SyncError::SyncInProgress.is_retryable());
        assert!(!SyncError::LimitExceeded { limit: 10 }.is_retryable());
        assert!(!SyncError::Codec("bad blob".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::LimitExceeded { limit: 10 };
        assert_eq!(err.to_string(), "bookmark limit reached: 10");
    }
}
