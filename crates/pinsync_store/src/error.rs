//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The key is not usable by this store.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A stored value could not be read back intact.
    #[error("store corrupted: {0}")]
    Corrupted(String),
}
