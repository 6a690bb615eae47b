//! Session and plan collaborator traits.
//!
//! The engine does not own authentication or plan limits; it observes them
//! through these traits. Production implementations wrap the app's auth
//! subsystem and billing tier; the in-crate implementations cover tests
//! and local-only sessions.

use parking_lot::RwLock;
use pinsync_protocol::UserId;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Supplies the session identity and the authenticated signal.
pub trait AuthProvider: Send + Sync {
    /// Returns true if the session currently holds valid credentials.
    fn is_authenticated(&self) -> bool;

    /// Returns the authenticated user id, or `None` for guest sessions.
    fn current_user_id(&self) -> Option<UserId>;
}

/// Supplies the active plan's bookmark limit.
pub trait TierPolicy: Send + Sync {
    /// Maximum number of bookmarks the plan allows, `None` when unbounded.
    ///
    /// The limit gates only new additions. A set already above the limit
    /// (after a plan downgrade) is frozen, never trimmed.
    fn max_bookmarks(&self) -> Option<usize>;
}

/// An auth provider holding a fixed, switchable identity.
///
/// Suitable for tests and for wiring the engine before the real auth
/// subsystem is attached.
#[derive(Debug, Default)]
pub struct StaticAuth {
    user: RwLock<Option<UserId>>,
}

impl StaticAuth {
    /// Creates an unauthenticated (guest) provider.
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }

    /// Creates a provider authenticated as `user`.
    pub fn authenticated(user: impl Into<UserId>) -> Self {
        Self {
            user: RwLock::new(Some(user.into())),
        }
    }

    /// Switches the provider to an authenticated identity.
    pub fn log_in(&self, user: impl Into<UserId>) {
        *self.user.write() = Some(user.into());
    }

    /// Clears the identity.
    pub fn log_out(&self) {
        *self.user.write() = None;
    }
}

impl AuthProvider for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.user.read().clone()
    }
}

/// A tier policy with no bookmark limit.
#[derive(Debug, Default)]
pub struct UnlimitedTier;

impl TierPolicy for UnlimitedTier {
    fn max_bookmarks(&self) -> Option<usize> {
        None
    }
}

/// A tier policy with a fixed limit, adjustable at runtime.
///
/// Lowering the limit below the current set size models a plan downgrade.
#[derive(Debug)]
pub struct FixedTier {
    limit: AtomicUsize,
}

impl FixedTier {
    /// Creates a policy allowing at most `limit` bookmarks.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: AtomicUsize::new(limit),
        }
    }

    /// Changes the limit, e.g. after a plan change.
    pub fn set_limit(&self, limit: usize) {
        self.limit.store(limit, Ordering::SeqCst);
    }
}

impl TierPolicy for FixedTier {
    fn max_bookmarks(&self) -> Option<usize> {
        Some(self.limit.load(Ordering::SeqCst))
    }
}
