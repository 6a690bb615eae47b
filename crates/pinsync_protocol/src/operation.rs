//! Pending bookmark operations.

use crate::id::BookmarkId;
use serde::{Deserialize, Serialize};

/// Kind of pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    /// The bookmark was added locally.
    Add,
    /// The bookmark was removed locally.
    Remove,
}

impl OpKind {
    /// Converts to a numeric code for compact encodings.
    #[must_use]
    pub fn to_code(&self) -> u8 {
        match self {
            OpKind::Add => 1,
            OpKind::Remove => 2,
        }
    }

    /// Converts from a numeric code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(OpKind::Add),
            2 => Some(OpKind::Remove),
            _ => None,
        }
    }
}

/// A locally recorded mutation awaiting remote acknowledgment.
///
/// Pending operations are owned exclusively by the pending log. They are
/// created when a mutation cannot be confirmed against the remote and
/// consumed when a sync cycle pushes the reconciled set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOp {
    /// What the user did.
    pub kind: OpKind,
    /// The bookmark the operation applies to.
    pub id: BookmarkId,
    /// When the operation was enqueued, in milliseconds since the Unix epoch.
    pub enqueued_at_ms: u64,
}

impl PendingOp {
    /// Creates a pending add.
    pub fn add(id: BookmarkId, enqueued_at_ms: u64) -> Self {
        Self {
            kind: OpKind::Add,
            id,
            enqueued_at_ms,
        }
    }

    /// Creates a pending remove.
    pub fn remove(id: BookmarkId, enqueued_at_ms: u64) -> Self {
        Self {
            kind: OpKind::Remove,
            id,
            enqueued_at_ms,
        }
    }
}
