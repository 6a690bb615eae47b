//! Wire messages for the bookmark REST surface.
//!
//! These are the engine-visible shapes of the remote API. The concrete
//! HTTP routing lives in the engine's transport layer; these structs only
//! define the JSON bodies.

use crate::id::BookmarkId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Body of an add-bookmark request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRequest {
    /// The bookmark to add.
    pub id: BookmarkId,
}

/// Body of a list-bookmarks response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// All bookmarks the remote currently holds for the user.
    pub ids: BTreeSet<BookmarkId>,
}

/// Body of a bulk-replace request.
///
/// Replaces the user's whole remote set; used to push a reconciled set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRequest {
    /// The full set of bookmarks after reconciliation.
    pub ids: BTreeSet<BookmarkId>,
}

/// Generic acknowledgment returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Whether the server applied the request.
    pub success: bool,
    /// Error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    /// Creates a successful acknowledgment.
    #[must_use]
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Creates a failed acknowledgment.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}
