//! Persistence adapter contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value contract the habit store depends on.
//! - Isolate SQLite and threading details from service orchestration.
//!
//! # Invariants
//! - A write replaces the whole value stored under a key.
//! - Writes issued through one adapter are applied in issue order.

pub mod kv_store;
pub mod queued_store;
