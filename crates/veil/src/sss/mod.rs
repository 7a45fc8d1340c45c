//! Threshold secret sharing of byte strings.
//!
//! Shamir's scheme over Mersenne prime fields: a secret is split into `n`
//! shares such that any `threshold` of them reconstruct it, while fewer than
//! `threshold` shares carry no information about it.

/// Configuration validation for threshold secret sharing
pub mod config;
mod encoding;
/// Shamir Secret Sharing implementation
pub mod shamir;
mod share;
/// Traits for secret sharing operations
pub mod traits;

pub use encoding::CHUNK_BYTES;
pub use shamir::{reconstruct, split, ShamirSecretSharing};
pub use share::{Share, SharePoint};
pub use traits::SecretSharer;
