//! Secret keys for the Paillier cryptosystem

use crate::paillier::{Ciphertext, Parameters, Plaintext, PublicKey};
use crate::proto::{SecretKey as SecretKeyProto, WIRE_VERSION};
use crate::{Error, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::{CheckedSub, One};
use prost::Message;
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;
use std::sync::Arc;
use veil_traits::{Deserialize, HomomorphicDecrypter, Serialize};
use veil_util::{generate_prime, mod_inverse};
use zeroize::Zeroizing;

/// Secret key for the Paillier cryptosystem.
///
/// The key keeps the serialized prime factors in zeroizing buffers. The
/// derived big integers used for decryption are not wiped on drop.
#[derive(PartialEq, Eq, Clone)]
pub struct SecretKey {
    pk: Arc<PublicKey>,
    p: Zeroizing<Vec<u8>>,
    q: Zeroizing<Vec<u8>>,
    phi: BigUint,
    mu: BigUint,
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey").field("pk", &self.pk).finish()
    }
}

impl SecretKey {
    /// Generate a random [`SecretKey`].
    pub fn random<R: RngCore + CryptoRng>(par: &Arc<Parameters>, rng: &mut R) -> Result<Self> {
        let prime_bits = par.prime_bits();
        loop {
            let p = generate_prime(prime_bits, rng)?;
            let q = generate_prime(prime_bits, rng)?;
            if p == q || (&p * &q).bits() as usize != par.key_bits() {
                continue;
            }
            log::debug!("Generated a {}-bit Paillier keypair", par.key_bits());
            return Self::from_primes(p, q);
        }
    }

    /// Generate a [`SecretKey`] from the prime factors of the public modulus.
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<Self> {
        if p == q {
            return Err(Error::invalid_parameter("prime factors must be distinct"));
        }
        let n = &p * &q;
        let pk = Arc::new(PublicKey::new(n)?);
        let phi = (&p - 1u32) * (&q - 1u32);
        let mu = mod_inverse(&phi, pk.n())?;
        Ok(Self {
            pk,
            p: Zeroizing::new(p.to_bytes_be()),
            q: Zeroizing::new(q.to_bytes_be()),
            phi,
            mu,
        })
    }

    /// Returns the public key associated with this secret key.
    pub fn public_key(&self) -> &Arc<PublicKey> {
        &self.pk
    }

    /// Decrypt to the encoded value in `Z_n`.
    ///
    /// `L(c^phi mod n^2) * mu mod n`, with `L(u) = (u - 1) / n`.
    fn raw_decrypt(&self, ct: &Ciphertext) -> Result<BigUint> {
        let n = self.pk.n();
        let u = ct.value.modpow(&self.phi, self.pk.n_squared());
        let l = u.checked_sub(&BigUint::one()).ok_or_else(|| {
            Error::UnspecifiedInput("Ciphertext value is not a unit modulo n^2".to_string())
        })? / n;
        Ok((l * &self.mu) % n)
    }

    /// Decode an element of `Z_n` to a signed mantissa.
    fn decode(&self, m: BigUint) -> Result<BigInt> {
        let n = self.pk.n();
        let max_int = self.pk.max_int();
        if &m <= max_int {
            Ok(BigInt::from(m))
        } else if m >= n - max_int {
            Ok(BigInt::from(m) - BigInt::from(n.clone()))
        } else {
            Err(Error::PlaintextOutOfRange)
        }
    }

    /// Returns whether `ct` encrypts zero, without decoding the plaintext.
    pub fn decrypts_to_zero(&self, ct: &Ciphertext) -> Result<bool> {
        self.check_key(ct)?;
        Ok(self.raw_decrypt(ct)? == BigUint::default())
    }

    fn check_key(&self, ct: &Ciphertext) -> Result<()> {
        if Arc::ptr_eq(&self.pk, &ct.pk) || *self.pk == *ct.pk {
            Ok(())
        } else {
            Err(Error::IncompatibleKeys)
        }
    }
}

impl HomomorphicDecrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        self.check_key(ct)?;
        let mantissa = self.decode(self.raw_decrypt(ct)?)?;
        Ok(Plaintext {
            mantissa,
            exponent: ct.exponent,
        })
    }
}

impl From<&SecretKey> for SecretKeyProto {
    fn from(sk: &SecretKey) -> Self {
        SecretKeyProto {
            version: WIRE_VERSION,
            p: sk.p.to_vec(),
            q: sk.q.to_vec(),
        }
    }
}

impl Serialize for SecretKey {
    fn to_bytes(&self) -> Vec<u8> {
        SecretKeyProto::from(self).encode_to_vec()
    }
}

impl Deserialize for SecretKey {
    type Error = Error;

    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        let proto: SecretKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        if proto.version != WIRE_VERSION {
            return Err(Error::SerializationError);
        }
        let p = BigUint::from_bytes_be(&Zeroizing::new(proto.p));
        let q = BigUint::from_bytes_be(&Zeroizing::new(proto.q));
        SecretKey::from_primes(p, q).map_err(|_| Error::SerializationError)
    }
}

#[cfg(test)]
impl SecretKey {
    /// Small keys to keep the test suite fast.
    pub(crate) fn random_for_tests<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let par = crate::paillier::ParametersBuilder::new()
            .set_key_bits(Parameters::MIN_KEY_BITS)
            .build_arc()
            .unwrap();
        Self::random(&par, rng).unwrap()
    }
}
