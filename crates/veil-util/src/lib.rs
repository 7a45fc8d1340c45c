#![crate_name = "veil_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Finite-field utilities for the veil session store.
//!
//! The secret-sharing layer works over prime fields whose modulus is chosen
//! from a fixed table of Mersenne primes; this crate provides that table, the
//! modulus selection routine, modular arithmetic helpers and Lagrange
//! interpolation. It also exposes random prime generation for key generation.

mod field;
mod primes;

pub use field::{
    evaluate_polynomial, lagrange_interpolate_at_zero, mod_exp, mod_inverse, random_polynomial,
};
pub use primes::{generate_prime, select_modulus, FieldModulus, MERSENNE_EXPONENTS};

/// Errors raised by the finite-field utilities.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// No prime in the table exceeds the values of a batch.
    #[error("No suitable modulus: a {0}-bit value exceeds the largest supported field")]
    NoSuitableModulus(u64),

    /// The element has no multiplicative inverse modulo the modulus.
    #[error("Value is not invertible modulo the given modulus")]
    NotInvertible,

    /// Indicates an invalid input.
    #[error("{0}")]
    InvalidInput(String),
}

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
