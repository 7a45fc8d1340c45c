//! Public keys for the Paillier cryptosystem

use crate::paillier::{Ciphertext, Plaintext};
use crate::proto::{PublicKey as PublicKeyProto, WIRE_VERSION};
use crate::{Error, Result};
use num_bigint::{BigUint, RandBigInt, Sign};
use num_traits::{One, Signed};
use prost::Message;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::sync::Arc;
use veil_traits::{Deserialize, HomomorphicEncrypter, Serialize};

/// Public key for the Paillier cryptosystem.
///
/// The generator is fixed to `g = n + 1`, so only `n` is transmitted.
#[derive(PartialEq, Eq, Clone)]
pub struct PublicKey {
    pub(crate) n: BigUint,
    pub(crate) n_squared: BigUint,
    pub(crate) g: BigUint,
    pub(crate) max_int: BigUint,
    pub(crate) key_id: [u8; 32],
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.n.bits())
            .field("key_id", &hex_prefix(&self.key_id))
            .finish()
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

impl PublicKey {
    /// Create a public key from the modulus `n`.
    pub fn new(n: BigUint) -> Result<Self> {
        if n.bits() < 16 || !n.bit(0) {
            return Err(Error::invalid_parameter(
                "public modulus must be an odd composite",
            ));
        }
        let n_squared = &n * &n;
        let g = &n + 1u32;
        let max_int = &n / 3u32 - 1u32;
        let key_id = Sha256::digest(n.to_bytes_be()).into();
        Ok(Self {
            n,
            n_squared,
            g,
            max_int,
            key_id,
        })
    }

    /// Returns the public modulus `n`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Returns the generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Returns `n^2`, the modulus of the ciphertext space.
    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    /// Returns the largest absolute value of an encodable mantissa.
    pub fn max_int(&self) -> &BigUint {
        &self.max_int
    }

    /// Returns the modulus identifier, the SHA-256 digest of `n`.
    pub fn key_id(&self) -> &[u8; 32] {
        &self.key_id
    }

    /// Returns the byte width of a serialized ciphertext value.
    pub fn ciphertext_width(&self) -> usize {
        ((self.n_squared.bits() + 7) / 8) as usize
    }

    /// Encode a signed mantissa as an element of `Z_n`.
    pub(crate) fn encode(&self, pt: &Plaintext) -> Result<BigUint> {
        let magnitude = pt.mantissa.magnitude();
        if magnitude > &self.max_int {
            return Err(Error::PlaintextOutOfRange);
        }
        Ok(match pt.mantissa.sign() {
            Sign::Minus => &self.n - magnitude,
            _ => magnitude.clone(),
        })
    }

    /// Encrypt an already encoded value `m` of `Z_n`.
    ///
    /// Since `g = n + 1`, `g^m = 1 + m n mod n^2`.
    pub(crate) fn raw_encrypt<R: RngCore + CryptoRng>(&self, m: &BigUint, rng: &mut R) -> BigUint {
        let nude = (&self.n * m + 1u32) % &self.n_squared;
        let r = rng.gen_biguint_range(&BigUint::one(), &self.n);
        let obfuscator = r.modpow(&self.n, &self.n_squared);
        (nude * obfuscator) % &self.n_squared
    }
}

impl HomomorphicEncrypter<Plaintext, Ciphertext> for Arc<PublicKey> {
    type Error = Error;

    fn try_encrypt<R: RngCore + CryptoRng>(&self, pt: &Plaintext, rng: &mut R) -> Result<Ciphertext> {
        let m = self.encode(pt)?;
        let value = self.raw_encrypt(&m, rng);
        Ok(Ciphertext {
            pk: self.clone(),
            value,
            exponent: pt.exponent,
        })
    }
}

impl From<&PublicKey> for PublicKeyProto {
    fn from(pk: &PublicKey) -> Self {
        PublicKeyProto {
            version: WIRE_VERSION,
            n: pk.n.to_bytes_be(),
        }
    }
}

impl Serialize for PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        PublicKeyProto::from(self).encode_to_vec()
    }
}

impl Deserialize for PublicKey {
    type Error = Error;

    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        let proto: PublicKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        if proto.version != WIRE_VERSION {
            return Err(Error::SerializationError);
        }
        PublicKey::new(BigUint::from_bytes_be(&proto.n)).map_err(|_| Error::SerializationError)
    }
}
