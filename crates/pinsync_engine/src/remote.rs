//! Remote bookmark client abstraction.

use parking_lot::Mutex;
use pinsync_protocol::{BookmarkId, UserId};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors a remote call can return.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the call can be retried.
        retryable: bool,
    },

    /// The call exceeded its bounded timeout.
    ///
    /// Treated identically to a network failure by the engine.
    #[error("request timed out")]
    Timeout,

    /// The session is not authorized for the account.
    #[error("not authorized")]
    Unauthorized,

    /// The server rejected the request.
    #[error("server error: {0}")]
    Server(String),
}

impl RemoteError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport { retryable, .. } => *retryable,
            RemoteError::Timeout => true,
            RemoteError::Server(_) => true,
            RemoteError::Unauthorized => false,
        }
    }
}

/// A client for the remote bookmark store.
///
/// This trait abstracts the network layer, allowing different
/// implementations (HTTP, mock for testing, etc.). Implementations carry
/// no retry logic of their own; each call maps to exactly one request
/// with a bounded timeout.
pub trait RemoteBookmarkClient: Send + Sync {
    /// Adds one bookmark to the user's remote set.
    fn add(&self, user: &UserId, id: &BookmarkId) -> RemoteResult<()>;

    /// Removes one bookmark from the user's remote set.
    fn remove(&self, user: &UserId, id: &BookmarkId) -> RemoteResult<()>;

    /// Fetches the user's full remote set.
    fn list(&self, user: &UserId) -> RemoteResult<BTreeSet<BookmarkId>>;

    /// Replaces the user's full remote set in one call.
    fn replace(&self, user: &UserId, ids: &BTreeSet<BookmarkId>) -> RemoteResult<()>;
}

/// A mock remote for testing.
///
/// Holds a real server-side set per user and supports scripting failures
/// per operation. Calls are recorded so tests can assert on traffic.
#[derive(Debug, Default)]
pub struct MockRemote {
    sets: Mutex<HashMap<UserId, BTreeSet<BookmarkId>>>,
    fail_add: Mutex<Option<RemoteError>>,
    fail_remove: Mutex<Option<RemoteError>>,
    fail_list: Mutex<Option<RemoteError>>,
    fail_replace: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<String>>,
}

impl MockRemote {
    /// Creates a new mock remote with no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the remote set for a user.
    pub fn seed(&self, user: &UserId, ids: impl IntoIterator<Item = BookmarkId>) {
        self.sets
            .lock()
            .insert(user.clone(), ids.into_iter().collect());
    }

    /// Returns the remote set for a user.
    #[must_use]
    pub fn ids(&self, user: &UserId) -> BTreeSet<BookmarkId> {
        self.sets.lock().get(user).cloned().unwrap_or_default()
    }

    /// Scripts `add` to fail with `error` until cleared with `None`.
    pub fn fail_add(&self, error: Option<RemoteError>) {
        *self.fail_add.lock() = error;
    }

    /// Scripts `remove` to fail with `error` until cleared with `None`.
    pub fn fail_remove(&self, error: Option<RemoteError>) {
        *self.fail_remove.lock() = error;
    }

    /// Scripts `list` to fail with `error` until cleared with `None`.
    pub fn fail_list(&self, error: Option<RemoteError>) {
        *self.fail_list.lock() = error;
    }

    /// Scripts `replace` to fail with `error` until cleared with `None`.
    pub fn fail_replace(&self, error: Option<RemoteError>) {
        *self.fail_replace.lock() = error;
    }

    /// Scripts every operation to fail with `error`.
    pub fn fail_all(&self, error: RemoteError) {
        self.fail_add(Some(error.clone()));
        self.fail_remove(Some(error.clone()));
        self.fail_list(Some(error.clone()));
        self.fail_replace(Some(error));
    }

    /// Clears all scripted failures.
    pub fn recover(&self) {
        self.fail_add(None);
        self.fail_remove(None);
        self.fail_list(None);
        self.fail_replace(None);
    }

    /// Returns the operations called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }

    fn check(&self, slot: &Mutex<Option<RemoteError>>) -> RemoteResult<()> {
        match &*slot.lock() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RemoteBookmarkClient for MockRemote {
    fn add(&self, user: &UserId, id: &BookmarkId) -> RemoteResult<()> {
        self.record("add");
        self.check(&self.fail_add)?;
        self.sets
            .lock()
            .entry(user.clone())
            .or_default()
            .insert(id.clone());
        Ok(())
    }

    fn remove(&self, user: &UserId, id: &BookmarkId) -> RemoteResult<()> {
        self.record("remove");
        self.check(&self.fail_remove)?;
        if let Some(ids) = self.sets.lock().get_mut(user) {
            ids.remove(id);
        }
        Ok(())
    }

    fn list(&self, user: &UserId) -> RemoteResult<BTreeSet<BookmarkId>> {
        self.record("list");
        self.check(&self.fail_list)?;
        Ok(self.ids(user))
    }

    fn replace(&self, user: &UserId, ids: &BTreeSet<BookmarkId>) -> RemoteResult<()> {
        self.record("replace");
        self.check(&self.fail_replace)?;
        self.sets.lock().insert(user.clone(), ids.clone());
        Ok(())
    }
}
