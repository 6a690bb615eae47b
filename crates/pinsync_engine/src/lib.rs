//! # Pinsync Engine
//!
//! Offline-first bookmark synchronization engine.
//!
//! This crate provides:
//! - Durable, write-through bookmark membership ([`BookmarkSet`])
//! - A durable log of unacknowledged mutations ([`PendingOperationLog`])
//! - The reconciliation engine and its state machine ([`SyncEngine`])
//! - Remote client abstraction with HTTP and mock implementations
//! - Retry with exponential backoff
//!
//! ## Architecture
//!
//! The engine implements a **local-first** model:
//! 1. Mutations apply to durable local state immediately
//! 2. The remote write is attempted synchronously; a failure queues the
//!    operation instead of failing the call
//! 3. A sync cycle fetches the remote set, union-merges it with local
//!    state, overlays the resolved pending intents, and pushes the result
//!
//! ## Key Invariants
//!
//! - Local intent is never lost: remote failures defer, they never roll
//!   back a local mutation
//! - Pending operations resolve last-write-wins per id
//! - An empty remote never downgrades a non-empty local set
//! - A failed sync push leaves local state untouched (no partial
//!   application)
//! - One engine per session; all operations for a session are serialized

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod codec;
mod config;
mod error;
mod http;
mod pending;
mod remote;
mod set;
mod state;

pub use auth::{AuthProvider, FixedTier, StaticAuth, TierPolicy, UnlimitedTier};
pub use config::{RetryConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpRemote};
pub use pending::PendingOperationLog;
pub use remote::{MockRemote, RemoteBookmarkClient, RemoteError, RemoteResult};
pub use set::BookmarkSet;
pub use state::{MutationOutcome, SyncEngine, SyncReport, SyncState, SyncStats};
