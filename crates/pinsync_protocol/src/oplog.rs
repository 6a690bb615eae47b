//! Ordered log of pending operations.

use crate::id::BookmarkId;
use crate::operation::{OpKind, PendingOp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An ordered log of pending bookmark operations.
///
/// The log is append-only during normal operation and truncated wholesale
/// after a successful sync push. Operations for the same id may appear
/// multiple times; the *last* operation for a given id determines its
/// resolved intent.
///
/// # Invariants
///
/// - Entries preserve enqueue order
/// - [`OpLog::resolve`] processes entries in that order, so last-write-wins
///   is well-defined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpLog {
    entries: Vec<PendingOp>,
}

impl OpLog {
    /// Creates a new empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation to the log.
    pub fn append(&mut self, op: PendingOp) {
        self.entries.push(op);
    }

    /// Removes the most recently appended operation.
    ///
    /// Used to undo an append whose persistence failed.
    pub fn pop(&mut self) -> Option<PendingOp> {
        self.entries.pop()
    }

    /// Returns the entries in enqueue order.
    #[must_use]
    pub fn entries(&self) -> &[PendingOp] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Collapses the log into one net intent per id.
    ///
    /// Entries are folded in enqueue order, so the last operation for a
    /// given id wins. A bookmark added and then removed while offline
    /// resolves to a remove; removed and then re-added resolves to an add.
    #[must_use]
    pub fn resolve(&self) -> ResolvedIntents {
        let mut intents: BTreeMap<&BookmarkId, OpKind> = BTreeMap::new();
        for op in &self.entries {
            intents.insert(&op.id, op.kind);
        }

        let mut resolved = ResolvedIntents::default();
        for (id, kind) in intents {
            match kind {
                OpKind::Add => resolved.adds.insert(id.clone()),
                OpKind::Remove => resolved.removes.insert(id.clone()),
            };
        }
        resolved
    }
}

/// The net adds and removes a pending log resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIntents {
    /// Ids whose net intent is to be bookmarked.
    pub adds: BTreeSet<BookmarkId>,
    /// Ids whose net intent is to not be bookmarked.
    pub removes: BTreeSet<BookmarkId>,
}

impl ResolvedIntents {
    /// Returns true if no intents remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }

    /// Applies the intents to a set of ids: removes first, then adds.
    pub fn apply_to(&self, ids: &mut BTreeSet<BookmarkId>) {
        for id in &self.removes {
            ids.remove(id);
        }
        for id in &self.adds {
            ids.insert(id.clone());
        }
    }
}
