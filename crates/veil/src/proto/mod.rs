//! Protobuf definitions for the wire structures of veil.
//!
//! The messages are declared in `veil.proto`; every message carries a
//! `version` field checked on decode.

#[allow(clippy::all)]
mod generated;

pub use generated::*;

/// Version of the wire structures produced by this crate.
pub const WIRE_VERSION: u32 = 1;
