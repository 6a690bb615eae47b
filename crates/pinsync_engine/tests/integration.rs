//! End-to-end tests for the bookmark sync engine.

use pinsync_engine::{
    AuthProvider, FixedTier, MockRemote, MutationOutcome, RemoteError, StaticAuth, SyncConfig,
    SyncEngine, SyncState, TierPolicy, UnlimitedTier,
};
use pinsync_protocol::{BookmarkId, UserId};
use pinsync_store::{FileStore, KeyValueStore, MemoryStore};
use std::collections::BTreeSet;
use std::sync::Arc;

fn id(s: &str) -> BookmarkId {
    BookmarkId::new(s)
}

fn alice() -> UserId {
    UserId::new("alice")
}

fn open_engine(
    store: Arc<dyn KeyValueStore>,
    remote: Arc<MockRemote>,
) -> SyncEngine<MockRemote> {
    let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuth::authenticated("alice"));
    let tier: Arc<dyn TierPolicy> = Arc::new(UnlimitedTier);
    SyncEngine::open(SyncConfig::default(), store, remote, auth, tier).unwrap()
}

#[test]
fn offline_mutations_push_on_next_sync() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    // The network is down for every individual write.
    remote.fail_all(RemoteError::transport_retryable("offline"));

    engine.add(&id("org-1")).unwrap();
    engine.add(&id("org-2")).unwrap();
    engine.remove(&id("org-1")).unwrap();
    assert_eq!(engine.pending_count(), 3);

    // Connectivity returns; one sync converges both sides.
    remote.recover();
    let report = engine.sync().unwrap();

    assert_eq!(report.cleared_pending, 3);
    assert_eq!(engine.pending_count(), 0);

    let expected: BTreeSet<_> = [id("org-2")].into_iter().collect();
    assert_eq!(engine.snapshot(), expected);
    assert_eq!(remote.ids(&alice()), expected);
}

#[test]
fn union_merge_of_local_and_remote() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    remote.fail_all(RemoteError::Timeout);
    engine.add(&id("org-1")).unwrap();
    engine.add(&id("org-2")).unwrap();
    remote.recover();

    remote.seed(&alice(), [id("org-2"), id("org-3")]);

    engine.sync().unwrap();

    let expected: BTreeSet<_> = [id("org-1"), id("org-2"), id("org-3")]
        .into_iter()
        .collect();
    assert_eq!(engine.snapshot(), expected);
    assert_eq!(remote.ids(&alice()), expected);
}

#[test]
fn offline_add_then_remove_resolves_to_noop() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    remote.fail_all(RemoteError::Timeout);
    engine.add(&id("org-42")).unwrap();
    engine.remove(&id("org-42")).unwrap();
    remote.recover();

    remote.seed(&alice(), [id("org-1")]);
    engine.sync().unwrap();

    // The stale pending add must not resurrect org-42.
    let expected: BTreeSet<_> = [id("org-1")].into_iter().collect();
    assert_eq!(engine.snapshot(), expected);
    assert_eq!(remote.ids(&alice()), expected);
}

#[test]
fn offline_remove_then_add_keeps_bookmark() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    // org-42 exists on both sides, then goes through remove+add offline.
    remote.seed(&alice(), [id("org-42")]);
    engine.add(&id("org-42")).unwrap();
    remote.fail_all(RemoteError::Timeout);
    engine.remove(&id("org-42")).unwrap();
    engine.add(&id("org-42")).unwrap();
    remote.recover();

    remote.seed(&alice(), [id("org-1")]);
    engine.sync().unwrap();

    let expected: BTreeSet<_> = [id("org-1"), id("org-42")].into_iter().collect();
    assert_eq!(engine.snapshot(), expected);
    assert_eq!(remote.ids(&alice()), expected);
}

#[test]
fn pending_remove_beats_stale_remote_entry() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    // Bookmark exists on both sides.
    engine.add(&id("org-7")).unwrap();

    // The unbookmark can't reach the server; the server still lists it.
    remote.fail_remove(Some(RemoteError::Timeout));
    engine.remove(&id("org-7")).unwrap();
    remote.fail_remove(None);

    engine.sync().unwrap();

    assert!(!engine.is_bookmarked(&id("org-7")));
    assert!(!remote.ids(&alice()).contains(&id("org-7")));
}

#[test]
fn empty_remote_never_downgrades_local() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    engine.add(&id("org-1")).unwrap();
    engine.add(&id("org-2")).unwrap();

    // Remote has nothing for this account yet.
    let report = engine.sync().unwrap();
    assert_eq!(report.merged, 2);

    let expected: BTreeSet<_> = [id("org-1"), id("org-2")].into_iter().collect();
    assert_eq!(engine.snapshot(), expected);
    assert_eq!(remote.ids(&alice()), expected);
}

#[test]
fn failed_push_leaves_state_byte_identical() {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(Arc::clone(&store) as Arc<dyn KeyValueStore>, Arc::clone(&remote));

    remote.fail_add(Some(RemoteError::Timeout));
    engine.add(&id("org-1")).unwrap();
    remote.fail_add(None);
    remote.seed(&alice(), [id("org-2")]);

    let set_blob_before = store.get("bookmarks/alice").unwrap();
    let log_blob_before = store.get("pending/alice").unwrap();

    remote.fail_replace(Some(RemoteError::transport_retryable("connection reset")));
    assert!(engine.sync().is_err());

    assert_eq!(store.get("bookmarks/alice").unwrap(), set_blob_before);
    assert_eq!(store.get("pending/alice").unwrap(), log_blob_before);
    assert_eq!(engine.state(), SyncState::Failed);

    // The same sync succeeds once the remote recovers.
    remote.fail_replace(None);
    engine.sync().unwrap();
    let expected: BTreeSet<_> = [id("org-1"), id("org-2")].into_iter().collect();
    assert_eq!(engine.snapshot(), expected);
}

#[test]
fn state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MockRemote::new());

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let engine = open_engine(store, Arc::clone(&remote));
        remote.fail_all(RemoteError::Timeout);
        engine.add(&id("org-1")).unwrap();
        engine.add(&id("org-2")).unwrap();
        engine.remove(&id("org-2")).unwrap();
    }

    // A fresh process: reopen over the same directory.
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let engine = open_engine(store, Arc::clone(&remote));

    assert!(engine.is_bookmarked(&id("org-1")));
    assert!(!engine.is_bookmarked(&id("org-2")));
    assert_eq!(engine.pending_count(), 3);
    assert_eq!(engine.state(), SyncState::Idle);

    remote.recover();
    engine.sync().unwrap();
    assert_eq!(
        remote.ids(&alice()),
        [id("org-1")].into_iter().collect::<BTreeSet<_>>()
    );
}

#[test]
fn limit_applies_only_to_new_adds_not_merges() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuth::authenticated("alice"));
    let tier: Arc<dyn TierPolicy> = Arc::new(FixedTier::new(2));
    let engine = SyncEngine::open(
        SyncConfig::default(),
        store,
        Arc::clone(&remote),
        auth,
        tier,
    )
    .unwrap();

    engine.add(&id("org-1")).unwrap();
    engine.add(&id("org-2")).unwrap();
    assert!(engine.add(&id("org-3")).is_err());

    // The remote holds more than the plan allows; the merge keeps them all.
    remote.seed(&alice(), [id("org-2"), id("org-8"), id("org-9")]);
    engine.sync().unwrap();

    assert_eq!(engine.snapshot().len(), 4);

    // New additions are still gated.
    assert!(engine.add(&id("org-10")).is_err());
}

#[test]
fn guest_session_is_local_only() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuth::guest());
    let tier: Arc<dyn TierPolicy> = Arc::new(UnlimitedTier);
    let engine = SyncEngine::open(
        SyncConfig::default(),
        store,
        Arc::clone(&remote),
        auth,
        tier,
    )
    .unwrap();

    assert!(engine.user().is_guest());

    let outcome = engine.add(&id("org-1")).unwrap();
    assert_eq!(outcome, MutationOutcome::AppliedAndQueued);
    assert!(engine.is_bookmarked(&id("org-1")));

    let report = engine.sync().unwrap();
    assert!(report.skipped);

    // Nothing of the guest's activity ever reaches the network.
    assert!(remote.calls().is_empty());
}

#[test]
fn mutators_never_fail_for_remote_reasons() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let engine = open_engine(store, Arc::clone(&remote));

    remote.fail_all(RemoteError::transport_fatal("tls misconfigured"));

    assert_eq!(
        engine.add(&id("org-1")).unwrap(),
        MutationOutcome::AppliedAndQueued
    );
    assert_eq!(
        engine.toggle(&id("org-2")).unwrap(),
        MutationOutcome::AppliedAndQueued
    );
    assert_eq!(
        engine.remove(&id("org-1")).unwrap(),
        MutationOutcome::AppliedAndQueued
    );
}
