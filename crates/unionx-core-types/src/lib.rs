//! Core types shared across unionx facilities
//!
//! This crate provides foundational types used by the union engine, its
//! error facility and its logging facility:
//!
//! - **Identity types**: NamespaceId
//! - **Snapshot keys**: Snapshot, SnapshotEntry
//! - **Schema constants**: Canonical field keys and event names

pub mod identity;
pub mod schema;
pub mod snapshot;

pub use identity::NamespaceId;
pub use snapshot::{Snapshot, SnapshotEntry};
