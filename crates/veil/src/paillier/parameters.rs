//! Parameters of the Paillier cryptosystem.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters of the Paillier cryptosystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    key_bits: usize,
}

impl Parameters {
    /// Default size in bits of the public modulus `n`.
    pub const DEFAULT_KEY_BITS: usize = 2048;

    /// Smallest accepted size in bits of the public modulus `n`.
    pub const MIN_KEY_BITS: usize = 512;

    /// Returns the size in bits of the public modulus `n`.
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// Returns the size in bits of each prime factor of `n`.
    pub fn prime_bits(&self) -> usize {
        self.key_bits / 2
    }

    /// Returns default parameters in an `Arc`.
    pub fn default_arc() -> Arc<Self> {
        Arc::new(Self {
            key_bits: Self::DEFAULT_KEY_BITS,
        })
    }
}

/// Builder for [`Parameters`].
///
/// The builder can be decoded from a configuration file with serde; missing
/// fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametersBuilder {
    key_bits: usize,
}

impl Default for ParametersBuilder {
    fn default() -> Self {
        Self {
            key_bits: Parameters::DEFAULT_KEY_BITS,
        }
    }
}

impl ParametersBuilder {
    /// Creates a new instance of the builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size in bits of the public modulus.
    pub fn set_key_bits(&mut self, key_bits: usize) -> &mut Self {
        self.key_bits = key_bits;
        self
    }

    /// Build a new [`Parameters`] inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<Parameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new [`Parameters`].
    pub fn build(&self) -> Result<Parameters> {
        if self.key_bits < Parameters::MIN_KEY_BITS {
            return Err(Error::invalid_parameter(format!(
                "key size of {} bits is below the minimum of {} bits",
                self.key_bits,
                Parameters::MIN_KEY_BITS
            )));
        }
        if self.key_bits % 2 != 0 {
            return Err(Error::invalid_parameter(format!(
                "key size of {} bits is not even",
                self.key_bits
            )));
        }
        Ok(Parameters {
            key_bits: self.key_bits,
        })
    }
}
