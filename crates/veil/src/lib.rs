#![crate_name = "veil"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! A privacy-preserving session store.
//!
//! Session attributes are indexed under encryption by the
//! [`index::SearchEngine`]: integers under the Paillier cryptosystem and
//! keywords as deterministic tokens. Encrypted session blobs are distributed
//! over independent storage backends by the
//! [`replication::ReplicationManager`], either as full replicas or as Shamir
//! threshold shares.
//!
//! Big-integer arithmetic relies on `num-bigint` and does not run in constant
//! time.

mod errors;

pub mod index;
pub mod paillier;
pub mod proto;
pub mod replication;
pub mod sss;
pub mod storage;

pub use errors::{Error, Result};
