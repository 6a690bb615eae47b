//! # Pinsync Protocol
//!
//! Bookmark sync protocol types for pinsync.
//!
//! This crate provides:
//! - [`BookmarkId`] and [`UserId`] identifier newtypes
//! - [`PendingOp`] for locally recorded, unacknowledged mutations
//! - [`OpLog`] and last-write-wins intent resolution
//! - Wire messages for the bookmark REST surface
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod id;
mod messages;
mod operation;
mod oplog;

pub use id::{BookmarkId, UserId};
pub use messages::{AckResponse, AddRequest, ListResponse, ReplaceRequest};
pub use operation::{OpKind, PendingOp};
pub use oplog::{OpLog, ResolvedIntents};
