//! Durable bookmark membership set.

use crate::codec;
use crate::error::SyncResult;
use pinsync_protocol::BookmarkId;
use pinsync_store::KeyValueStore;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The set of currently bookmarked ids, bound to one store key.
///
/// Every mutating call persists the full snapshot write-through before
/// returning, so a crash immediately after a UI action never loses the
/// user's intent. A persistence failure rolls the in-memory change back
/// and surfaces the error.
///
/// Tier limits are enforced by the engine, not here: ids arriving through
/// [`BookmarkSet::replace`] after a merge are never evicted.
pub struct BookmarkSet {
    store: Arc<dyn KeyValueStore>,
    key: String,
    ids: BTreeSet<BookmarkId>,
}

impl BookmarkSet {
    /// Loads the set persisted under `key`, or an empty set if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the blob cannot be decoded.
    pub fn load(store: Arc<dyn KeyValueStore>, key: String) -> SyncResult<Self> {
        let ids = match store.get(&key)? {
            Some(bytes) => codec::decode(&bytes)?,
            None => BTreeSet::new(),
        };

        Ok(Self { store, key, ids })
    }

    /// Returns true if `id` is bookmarked.
    #[must_use]
    pub fn contains(&self, id: &BookmarkId) -> bool {
        self.ids.contains(id)
    }

    /// Returns the number of bookmarks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no bookmarks are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Adds `id`, returning false if it was already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted; the set is
    /// unchanged in that case.
    pub fn add(&mut self, id: BookmarkId) -> SyncResult<bool> {
        if self.ids.contains(&id) {
            return Ok(false);
        }

        self.ids.insert(id.clone());
        if let Err(err) = self.persist() {
            self.ids.remove(&id);
            return Err(err);
        }
        Ok(true)
    }

    /// Removes `id`, returning false if it was absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted; the set is
    /// unchanged in that case.
    pub fn remove(&mut self, id: &BookmarkId) -> SyncResult<bool> {
        if !self.ids.remove(id) {
            return Ok(false);
        }

        if let Err(err) = self.persist() {
            self.ids.insert(id.clone());
            return Err(err);
        }
        Ok(true)
    }

    /// Atomically substitutes the full contents.
    ///
    /// Used only with the result of a successful merge-and-push.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted; the set is
    /// unchanged in that case.
    pub fn replace(&mut self, ids: BTreeSet<BookmarkId>) -> SyncResult<()> {
        let previous = std::mem::replace(&mut self.ids, ids);
        if let Err(err) = self.persist() {
            self.ids = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Returns a copy of the current membership.
    #[must_use]
    pub fn snapshot(&self) -> BTreeSet<BookmarkId> {
        self.ids.clone()
    }

    /// Empties the set and removes its store key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub fn purge(&mut self) -> SyncResult<()> {
        self.store.remove(&self.key)?;
        self.ids.clear();
        Ok(())
    }

    fn persist(&self) -> SyncResult<()> {
        let bytes = codec::encode(&self.ids)?;
        self.store.set(&self.key, &bytes)?;
        Ok(())
    }
}
