//! Replication and sharding of session blobs over storage backends.
//!
//! Full replication stores a copy of the blob on every backend, so any single
//! backend can serve it. Sharding stores one threshold share per backend, so
//! no set of fewer than `threshold` backends learns the blob, and up to
//! `n - threshold` backends may be lost.

mod manager;

pub use manager::ReplicationManager;
