//! Plaintext type of the Paillier cryptosystem.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// Base of the exponent of encoded numbers.
pub const BASE: u32 = 16;

/// A signed integer `mantissa * BASE^exponent`.
///
/// Integers are encrypted with exponent zero; a non-zero exponent only
/// appears after exponent alignment during homomorphic arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plaintext {
    /// The signed mantissa
    pub mantissa: BigInt,
    /// The exponent
    pub exponent: i32,
}

impl Plaintext {
    /// Create a plaintext from its mantissa and exponent.
    pub fn new<T: Into<BigInt>>(mantissa: T, exponent: i32) -> Self {
        Self {
            mantissa: mantissa.into(),
            exponent,
        }
    }

    /// Returns whether the encoded number is zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Returns the encoded number as an `i64`, if it is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.exponent < 0 {
            return None;
        }
        let scale = BigInt::from(BASE).pow(self.exponent as u32);
        (&self.mantissa * scale).to_i64()
    }
}

impl From<i64> for Plaintext {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}
