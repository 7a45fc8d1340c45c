//! Field moduli for secret sharing and prime generation for key material.

use crate::{Error, Result};
use num_bigint::BigUint;
use num_bigint_dig::RandPrime;
use num_traits::One;
use rand::{CryptoRng, RngCore};

/// Exponents `e` such that `2^e - 1` is prime, in ascending order, up to 521.
pub const MERSENNE_EXPONENTS: [u32; 13] = [2, 3, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127, 521];

/// A Mersenne prime `2^e - 1` used as a secret-sharing field modulus.
///
/// The modulus is identified by its exponent, which is what gets persisted
/// alongside shares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldModulus {
    exponent: u32,
    p: BigUint,
}

impl FieldModulus {
    /// Create the modulus `2^exponent - 1`.
    ///
    /// Returns an error if `exponent` is not in [`MERSENNE_EXPONENTS`].
    pub fn from_exponent(exponent: u32) -> Result<Self> {
        if !MERSENNE_EXPONENTS.contains(&exponent) {
            return Err(Error::InvalidInput(format!(
                "2^{} - 1 is not a supported field modulus",
                exponent
            )));
        }
        Ok(Self {
            exponent,
            p: (BigUint::one() << exponent) - 1u32,
        })
    }

    /// The largest modulus of the table.
    pub fn largest() -> Self {
        let exponent = MERSENNE_EXPONENTS[MERSENNE_EXPONENTS.len() - 1];
        Self {
            exponent,
            p: (BigUint::one() << exponent) - 1u32,
        }
    }

    /// Returns the exponent `e` of the modulus `2^e - 1`.
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// Returns the modulus as a BigUint.
    pub fn value(&self) -> &BigUint {
        &self.p
    }
}

/// Returns the smallest modulus of the table that is strictly greater than
/// every value in `values`.
///
/// Nested batches are flattened by the caller (e.g. with
/// `Iterator::flatten`). An empty batch selects the smallest modulus.
pub fn select_modulus<'a, I>(values: I) -> Result<FieldModulus>
where
    I: IntoIterator<Item = &'a BigUint>,
{
    let largest = values.into_iter().max();
    for exponent in MERSENNE_EXPONENTS {
        let modulus = FieldModulus::from_exponent(exponent)?;
        if largest.map_or(true, |v| modulus.value() > v) {
            return Ok(modulus);
        }
    }
    Err(Error::NoSuitableModulus(largest.map_or(0, |v| v.bits())))
}

/// Generate a random prime of exactly `bits` bits.
pub fn generate_prime<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<BigUint> {
    if bits < 16 {
        return Err(Error::InvalidInput(format!(
            "Prime size of {} bits is too small",
            bits
        )));
    }
    let p = rng.gen_prime(bits);
    Ok(BigUint::from_bytes_be(&p.to_bytes_be()))
}
