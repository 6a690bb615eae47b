//! Sync engine state machine.

use crate::auth::{AuthProvider, TierPolicy};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::pending::PendingOperationLog;
use crate::remote::RemoteBookmarkClient;
use crate::set::BookmarkSet;
use parking_lot::{Mutex, RwLock};
use pinsync_protocol::{BookmarkId, OpKind, UserId};
use pinsync_store::KeyValueStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The current state of the sync engine.
///
/// Transient; never persisted. Every engine starts at
/// [`SyncState::Idle`] regardless of how its last session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No sync cycle is running.
    Idle,
    /// A sync cycle is reconciling local and remote state.
    Syncing,
    /// The last sync cycle failed; see `SyncStats::last_error`.
    Failed,
}

impl SyncState {
    /// Returns true if a sync cycle is currently running.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Syncing)
    }

    /// Returns true if a new sync cycle may start.
    pub fn can_start_sync(&self) -> bool {
        matches!(self, SyncState::Idle | SyncState::Failed)
    }
}

/// Outcome of a local mutation.
///
/// Queuing is an expected outcome of working offline, not an error, so it
/// is modeled as a variant rather than an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The local write succeeded and the remote acknowledged it.
    Applied,
    /// The local write succeeded; the remote write is queued for the next
    /// sync cycle.
    AppliedAndQueued,
    /// The set already matched the requested state; nothing changed.
    Unchanged,
}

/// Statistics about engine activity.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Sync cycles completed successfully.
    pub syncs_completed: u64,
    /// Mutations that could not be confirmed remotely and were queued.
    pub operations_deferred: u64,
    /// Total ids pushed across successful sync cycles.
    pub ids_pushed: u64,
    /// Retries performed by `sync_with_retry`.
    pub retries: u64,
    /// When the last successful sync finished.
    pub last_sync_time: Option<Instant>,
    /// Message of the last sync failure, cleared on success.
    pub last_error: Option<String>,
}

/// Result of one sync cycle.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Size of the reconciled set pushed to the remote.
    pub merged: usize,
    /// Pending intents that resolved to adds.
    pub resolved_adds: usize,
    /// Pending intents that resolved to removes.
    pub resolved_removes: usize,
    /// Pending log entries consumed by this cycle.
    pub cleared_pending: usize,
    /// Wall-clock duration of the cycle.
    pub duration: Duration,
    /// True if the cycle was skipped because the session is
    /// unauthenticated. Local state is untouched in that case.
    pub skipped: bool,
}

impl SyncReport {
    fn skipped(duration: Duration) -> Self {
        Self {
            merged: 0,
            resolved_adds: 0,
            resolved_removes: 0,
            cleared_pending: 0,
            duration,
            skipped: true,
        }
    }
}

/// The durable per-session state the engine serializes access to.
struct SessionState {
    set: BookmarkSet,
    pending: PendingOperationLog,
}

/// The bookmark synchronization engine for one session.
///
/// Construct one engine per session via [`SyncEngine::open`] and pass it
/// explicitly to the layers that need it; its lifecycle is tied to
/// login/logout, not to process-wide state.
///
/// # Concurrency
///
/// All operations for a session are serialized on an internal lock; a
/// sync cycle holds it across the full reconciliation, so mutations never
/// interleave with a merge. A sync requested while another is in flight
/// is rejected with [`SyncError::SyncInProgress`] rather than queued.
pub struct SyncEngine<R: RemoteBookmarkClient> {
    config: SyncConfig,
    remote: Arc<R>,
    auth: Arc<dyn AuthProvider>,
    tier: Arc<dyn TierPolicy>,
    user: UserId,
    session: Mutex<SessionState>,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

fn bookmarks_key(user: &UserId) -> String {
    format!("bookmarks/{}", user.as_str())
}

fn pending_key(user: &UserId) -> String {
    format!("pending/{}", user.as_str())
}

impl<R: RemoteBookmarkClient> SyncEngine<R> {
    /// Opens the engine for the current session identity.
    ///
    /// Loads the durable bookmark set and pending log for the
    /// authenticated user, or for the local-only guest identity when the
    /// session is unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be loaded.
    pub fn open(
        config: SyncConfig,
        store: Arc<dyn KeyValueStore>,
        remote: Arc<R>,
        auth: Arc<dyn AuthProvider>,
        tier: Arc<dyn TierPolicy>,
    ) -> SyncResult<Self> {
        let user = auth.current_user_id().unwrap_or_else(UserId::guest);
        let set = BookmarkSet::load(Arc::clone(&store), bookmarks_key(&user))?;
        let pending = PendingOperationLog::load(store, pending_key(&user))?;

        Ok(Self {
            config,
            remote,
            auth,
            tier,
            user,
            session: Mutex::new(SessionState { set, pending }),
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        })
    }

    /// Returns the session identity this engine serves.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Returns the current sync state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Returns a copy of the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Returns the message of the last sync failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.stats.read().last_error.clone()
    }

    /// Returns true if `id` is bookmarked. No I/O.
    pub fn is_bookmarked(&self, id: &BookmarkId) -> bool {
        self.session.lock().set.contains(id)
    }

    /// Returns a copy of the current bookmark membership.
    pub fn snapshot(&self) -> BTreeSet<BookmarkId> {
        self.session.lock().set.snapshot()
    }

    /// Returns the number of operations awaiting remote acknowledgment.
    pub fn pending_count(&self) -> usize {
        self.session.lock().pending.len()
    }

    /// Bookmarks `id`.
    ///
    /// The local write is durable before the remote is attempted; a remote
    /// failure queues the operation and still reports success.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LimitExceeded`] if the active plan's limit is
    /// reached (nothing is mutated or enqueued), or a store error if the
    /// local write fails.
    pub fn add(&self, id: &BookmarkId) -> SyncResult<MutationOutcome> {
        let mut session = self.session.lock();
        self.add_locked(&mut session, id)
    }

    /// Removes the bookmark for `id`. No limit check applies.
    ///
    /// # Errors
    ///
    /// Returns a store error if the local write fails.
    pub fn remove(&self, id: &BookmarkId) -> SyncResult<MutationOutcome> {
        let mut session = self.session.lock();
        self.remove_locked(&mut session, id)
    }

    /// Removes `id` if bookmarked, adds it otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`SyncEngine::add`] and [`SyncEngine::remove`].
    pub fn toggle(&self, id: &BookmarkId) -> SyncResult<MutationOutcome> {
        let mut session = self.session.lock();
        if session.set.contains(id) {
            self.remove_locked(&mut session, id)
        } else {
            self.add_locked(&mut session, id)
        }
    }

    fn add_locked(
        &self,
        session: &mut SessionState,
        id: &BookmarkId,
    ) -> SyncResult<MutationOutcome> {
        if session.set.contains(id) {
            return Ok(MutationOutcome::Unchanged);
        }

        if let Some(limit) = self.tier.max_bookmarks() {
            if session.set.len() >= limit {
                return Err(SyncError::LimitExceeded { limit });
            }
        }

        session.set.add(id.clone())?;
        self.confirm_or_enqueue(session, OpKind::Add, id)
    }

    fn remove_locked(
        &self,
        session: &mut SessionState,
        id: &BookmarkId,
    ) -> SyncResult<MutationOutcome> {
        if !session.set.remove(id)? {
            return Ok(MutationOutcome::Unchanged);
        }

        self.confirm_or_enqueue(session, OpKind::Remove, id)
    }

    /// Attempts the remote write for an already-durable local mutation.
    ///
    /// Unauthenticated sessions skip the attempt entirely; their pending
    /// log is local-only and never pushed.
    fn confirm_or_enqueue(
        &self,
        session: &mut SessionState,
        kind: OpKind,
        id: &BookmarkId,
    ) -> SyncResult<MutationOutcome> {
        if self.auth.is_authenticated() && !self.user.is_guest() {
            let result = match kind {
                OpKind::Add => self.remote.add(&self.user, id),
                OpKind::Remove => self.remote.remove(&self.user, id),
            };

            match result {
                Ok(()) => return Ok(MutationOutcome::Applied),
                Err(err) => {
                    tracing::debug!(id = %id, %err, "remote write failed, queueing");
                }
            }
        }

        session.pending.enqueue(kind, id.clone())?;
        self.stats.write().operations_deferred += 1;
        Ok(MutationOutcome::AppliedAndQueued)
    }

    /// Runs one reconciliation cycle.
    ///
    /// Fetches the remote set, union-merges it with local state, overlays
    /// the resolved pending intents, and pushes the result. Local state
    /// moves only after the remote accepted the push; any failure leaves
    /// the bookmark set and pending log exactly as they were.
    ///
    /// Unauthenticated sessions return a skipped report without touching
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SyncInProgress`] if a cycle is already in
    /// flight, or the remote/store error that aborted the cycle.
    pub fn sync(&self) -> SyncResult<SyncReport> {
        let start = Instant::now();

        if !self.auth.is_authenticated() || self.user.is_guest() {
            tracing::debug!(user = %self.user, "sync skipped, not authenticated");
            return Ok(SyncReport::skipped(start.elapsed()));
        }

        if !self.state().can_start_sync() {
            return Err(SyncError::SyncInProgress);
        }

        let mut session = self.session.lock();
        self.set_state(SyncState::Syncing);
        tracing::debug!(
            user = %self.user,
            pending = session.pending.len(),
            "sync started"
        );

        match self.reconcile(&mut session) {
            Ok(mut report) => {
                report.duration = start.elapsed();
                self.set_state(SyncState::Idle);

                let mut stats = self.stats.write();
                stats.syncs_completed += 1;
                stats.ids_pushed += report.merged as u64;
                stats.last_sync_time = Some(Instant::now());
                stats.last_error = None;
                drop(stats);

                tracing::info!(
                    user = %self.user,
                    merged = report.merged,
                    cleared = report.cleared_pending,
                    "sync completed"
                );
                Ok(report)
            }
            Err(err) => {
                self.set_state(SyncState::Failed);
                self.stats.write().last_error = Some(err.to_string());
                tracing::warn!(user = %self.user, %err, "sync failed");
                Err(err)
            }
        }
    }

    /// Runs [`SyncEngine::sync`], retrying on retryable errors with the
    /// configured backoff.
    ///
    /// # Errors
    ///
    /// Returns the last error once attempts are exhausted, or immediately
    /// for non-retryable errors.
    pub fn sync_with_retry(&self) -> SyncResult<SyncReport> {
        let mut attempt = 0;

        loop {
            match self.sync() {
                Ok(report) => return Ok(report),
                Err(err) => {
                    attempt += 1;
                    if !err.is_retryable() || attempt >= self.config.retry.max_attempts {
                        return Err(err);
                    }

                    let delay = self.config.retry.delay_for_attempt(attempt);
                    tracing::debug!(attempt, ?delay, "retrying sync");
                    self.stats.write().retries += 1;
                    std::thread::sleep(delay);
                }
            }
        }
    }

    /// Wipes the session's durable state, e.g. on logout.
    ///
    /// # Errors
    ///
    /// Returns a store error if a key cannot be removed.
    pub fn clear_local(&self) -> SyncResult<()> {
        let mut session = self.session.lock();
        session.set.purge()?;
        session.pending.purge()?;
        Ok(())
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    fn reconcile(&self, session: &mut SessionState) -> SyncResult<SyncReport> {
        let local = session.set.snapshot();
        let remote_ids = self.remote.list(&self.user)?;

        // A remote holding nothing while the device has bookmarks means
        // the account has never pushed, not that the remote is
        // authoritatively empty. Push local state instead of downgrading.
        if remote_ids.is_empty() && !local.is_empty() {
            self.remote.replace(&self.user, &local)?;
            let cleared = session.pending.len();
            session.pending.clear()?;

            return Ok(SyncReport {
                merged: local.len(),
                resolved_adds: 0,
                resolved_removes: 0,
                cleared_pending: cleared,
                duration: Duration::ZERO,
                skipped: false,
            });
        }

        let mut merged: BTreeSet<BookmarkId> = local.union(&remote_ids).cloned().collect();
        let intents = session.pending.resolve();
        intents.apply_to(&mut merged);

        self.remote.replace(&self.user, &merged)?;

        // Local state moves only after the remote accepted the push.
        session.set.replace(merged.clone())?;
        let cleared = session.pending.len();
        session.pending.clear()?;

        Ok(SyncReport {
            merged: merged.len(),
            resolved_adds: intents.adds.len(),
            resolved_removes: intents.removes.len(),
            cleared_pending: cleared,
            duration: Duration::ZERO,
            skipped: false,
        })
    }
}
