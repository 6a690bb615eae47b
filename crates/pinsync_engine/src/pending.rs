//! Durable log of pending operations.

use crate::codec;
use crate::error::SyncResult;
use pinsync_protocol::{BookmarkId, OpKind, OpLog, PendingOp, ResolvedIntents};
use pinsync_store::KeyValueStore;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// The durable, ordered log of not-yet-acknowledged mutations.
///
/// Wraps the pure [`OpLog`] with write-through persistence to one store
/// key. Entries survive process restarts and are truncated wholesale
/// after a successful sync push.
pub struct PendingOperationLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
    log: OpLog,
}

impl PendingOperationLog {
    /// Loads the log persisted under `key`, or an empty log if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the blob cannot be decoded.
    pub fn load(store: Arc<dyn KeyValueStore>, key: String) -> SyncResult<Self> {
        let log = match store.get(&key)? {
            Some(bytes) => codec::decode(&bytes)?,
            None => OpLog::new(),
        };

        Ok(Self { store, key, log })
    }

    /// Appends an operation stamped with the current time and persists.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be persisted; the log is
    /// unchanged in that case.
    pub fn enqueue(&mut self, kind: OpKind, id: BookmarkId) -> SyncResult<()> {
        let op = match kind {
            OpKind::Add => PendingOp::add(id, now_ms()),
            OpKind::Remove => PendingOp::remove(id, now_ms()),
        };

        self.log.append(op);
        if let Err(err) = self.persist() {
            self.log.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Returns the entries in enqueue order.
    #[must_use]
    pub fn all(&self) -> &[PendingOp] {
        self.log.entries()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Collapses the log into one net intent per id, last write wins.
    #[must_use]
    pub fn resolve(&self) -> ResolvedIntents {
        self.log.resolve()
    }

    /// Truncates the log and persists the empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be persisted; the log is
    /// unchanged in that case.
    pub fn clear(&mut self) -> SyncResult<()> {
        let previous = std::mem::take(&mut self.log);
        if let Err(err) = self.persist() {
            self.log = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Empties the log and removes its store key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub fn purge(&mut self) -> SyncResult<()> {
        self.store.remove(&self.key)?;
        self.log.clear();
        Ok(())
    }

    fn persist(&self) -> SyncResult<()> {
        let bytes = codec::encode(&self.log)?;
        self.store.set(&self.key, &bytes)?;
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
