//! Key-value store trait definition.

use crate::error::StoreResult;

/// A durable key→bytes store.
///
/// Stores are **opaque blob stores**. They provide simple operations for
/// reading, writing, and removing whole values. The engine owns all value
/// encoding - stores do not understand bookmark sets or pending logs.
///
/// # Invariants
///
/// - `set` replaces the whole value atomically; a crash mid-write never
///   leaves a torn value behind
/// - `get` returns exactly the bytes of the most recent completed `set`
/// - when `set` returns, the value is durable
/// - stores must be `Send + Sync` for shared access
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Durably writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Removes the value stored under `key`. Removing an absent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Lists all keys currently present in the store.
    ///
    /// Order is unspecified. Used to wipe a session's namespace on logout.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn keys(&self) -> StoreResult<Vec<String>>;
}
