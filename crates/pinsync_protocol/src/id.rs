//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a bookmarkable item.
///
/// Ids are opaque strings. The engine assumes nothing about their internal
/// structure beyond equality; ordering exists only so ids can live in
/// ordered collections with deterministic snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(String);

impl BookmarkId {
    /// Creates a bookmark id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookmarkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BookmarkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifies the account whose bookmarks are being synced.
///
/// Each user id names one storage namespace and one remote account. The
/// distinguished [`UserId::guest`] identity holds local-only state for
/// unauthenticated sessions; it is never pushed to the remote.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

const GUEST: &str = "_guest";

impl UserId {
    /// Creates a user id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the local-only guest identity.
    #[must_use]
    pub fn guest() -> Self {
        Self(GUEST.to_string())
    }

    /// Returns true if this is the guest identity.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0 == GUEST
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookmark_id_equality() {
        assert_eq!(BookmarkId::new("org-1"), BookmarkId::from("org-1"));
        assert_ne!(BookmarkId::new("org-1"), BookmarkId::new("org-2"));
    }

    #[test]
    fn bookmark_id_display() {
        assert_eq!(BookmarkId::new("org-42").to_string(), "org-42");
    }

    #[test]
    fn guest_identity() {
        assert!(UserId::guest().is_guest());
        assert!(!UserId::new("alice").is_guest());
    }
}
