#![warn(missing_docs, unused_imports)]

//! The Paillier cryptosystem, an additively homomorphic public-key scheme.
//!
//! Encryption of `m` under `n` with generator `g = n + 1` is
//! `g^m r^n mod n^2`; multiplying two ciphertexts adds the plaintexts.

mod ciphertext;
mod keys;
mod parameters;
mod plaintext;

pub use ciphertext::Ciphertext;
pub use keys::{PublicKey, SecretKey};
pub use parameters::{Parameters, ParametersBuilder};
pub use plaintext::{Plaintext, BASE};
