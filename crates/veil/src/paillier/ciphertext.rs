//! Ciphertext type in the Paillier cryptosystem.

use crate::paillier::plaintext::BASE;
use crate::paillier::PublicKey;
use crate::proto::{Ciphertext as CiphertextProto, WIRE_VERSION};
use crate::{Error, Result};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use prost::Message;
use std::fmt::Debug;
use std::sync::Arc;
use veil_traits::{DeserializeWithKey, Serialize};
use veil_util::mod_inverse;

/// An encrypted integer `mantissa * BASE^exponent`.
///
/// A ciphertext is bound to the public key it was produced under; combining
/// ciphertexts of different keys fails with [`Error::IncompatibleKeys`].
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// The public key the ciphertext was produced under.
    pub(crate) pk: Arc<PublicKey>,

    /// The ciphertext value, in `[1, n^2)`.
    pub(crate) value: BigUint,

    /// The exponent of the encrypted number.
    pub(crate) exponent: i32,
}

impl Debug for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ciphertext")
            .field("pk", &self.pk)
            .field("exponent", &self.exponent)
            .finish()
    }
}

impl Ciphertext {
    /// Create a ciphertext from its raw value.
    ///
    /// Returns an error if `value` is not a unit of `Z_{n^2}`, i.e. not in
    /// `[1, n^2)` or not coprime with `n`.
    pub fn new(value: BigUint, exponent: i32, pk: &Arc<PublicKey>) -> Result<Self> {
        if value.is_zero() || &value >= pk.n_squared() {
            return Err(Error::UnspecifiedInput(
                "Ciphertext value is outside of the ciphertext space".to_string(),
            ));
        }
        if mod_inverse(&value, pk.n()).is_err() {
            return Err(Error::UnspecifiedInput(
                "Ciphertext value is not coprime with the public modulus".to_string(),
            ));
        }
        Ok(Self {
            pk: pk.clone(),
            value,
            exponent,
        })
    }

    /// Returns the public key the ciphertext was produced under.
    pub fn public_key(&self) -> &Arc<PublicKey> {
        &self.pk
    }

    /// Returns the raw ciphertext value.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Returns the exponent of the encrypted number.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if Arc::ptr_eq(&self.pk, &other.pk) || *self.pk == *other.pk {
            Ok(())
        } else {
            Err(Error::IncompatibleKeys)
        }
    }

    fn with_value(&self, value: BigUint, exponent: i32) -> Self {
        Self {
            pk: self.pk.clone(),
            value,
            exponent,
        }
    }

    /// Rewrite the ciphertext so that it encrypts the same number with a
    /// smaller exponent, by multiplying the mantissa by `BASE^(exponent - new_exponent)`.
    pub fn decrease_exponent_to(&self, new_exponent: i32) -> Result<Self> {
        if new_exponent > self.exponent {
            return Err(Error::UnspecifiedInput(format!(
                "New exponent {} should be smaller than the current exponent {}",
                new_exponent, self.exponent
            )));
        }
        if new_exponent == self.exponent {
            return Ok(self.clone());
        }
        let factor = BigUint::from(BASE).pow((self.exponent - new_exponent) as u32);
        let value = self.value.modpow(&factor, self.pk.n_squared());
        Ok(self.with_value(value, new_exponent))
    }

    /// Bring both ciphertexts to the smaller of their exponents.
    fn aligned(&self, other: &Self) -> Result<(Self, Self)> {
        let exponent = self.exponent.min(other.exponent);
        Ok((
            self.decrease_exponent_to(exponent)?,
            other.decrease_exponent_to(exponent)?,
        ))
    }

    /// Homomorphic addition: the result encrypts the sum of both plaintexts.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let (a, b) = self.aligned(other)?;
        let value = (&a.value * &b.value) % self.pk.n_squared();
        Ok(self.with_value(value, a.exponent))
    }

    /// Homomorphic negation.
    pub fn try_neg(&self) -> Result<Self> {
        let value = mod_inverse(&self.value, self.pk.n_squared())?;
        Ok(self.with_value(value, self.exponent))
    }

    /// Homomorphic subtraction: the result encrypts `self - other`.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        self.try_add(&other.try_neg()?)
    }

    /// Multiply the encrypted number by a plaintext integer scalar.
    pub fn try_mul_plain(&self, scalar: &BigInt) -> Result<Self> {
        let base = match scalar.sign() {
            Sign::Minus => self.try_neg()?,
            _ => self.clone(),
        };
        let value = base.value.modpow(scalar.magnitude(), self.pk.n_squared());
        Ok(self.with_value(value, self.exponent))
    }
}

impl From<&Ciphertext> for CiphertextProto {
    fn from(ct: &Ciphertext) -> Self {
        let width = ct.pk.ciphertext_width();
        let bytes = ct.value.to_bytes_be();
        let mut value = vec![0u8; width - bytes.len()];
        value.extend_from_slice(&bytes);
        CiphertextProto {
            version: WIRE_VERSION,
            key_id: ct.pk.key_id().to_vec(),
            value,
            exponent: ct.exponent,
        }
    }
}

impl Ciphertext {
    pub(crate) fn try_from_proto(proto: &CiphertextProto, pk: &Arc<PublicKey>) -> Result<Self> {
        if proto.version != WIRE_VERSION || proto.value.len() != pk.ciphertext_width() {
            return Err(Error::SerializationError);
        }
        if proto.key_id.as_slice() != pk.key_id().as_slice() {
            return Err(Error::IncompatibleKeys);
        }
        Ciphertext::new(BigUint::from_bytes_be(&proto.value), proto.exponent, pk)
            .map_err(|_| Error::SerializationError)
    }
}

impl Serialize for Ciphertext {
    fn to_bytes(&self) -> Vec<u8> {
        CiphertextProto::from(self).encode_to_vec()
    }
}

impl DeserializeWithKey for Ciphertext {
    type Error = Error;
    type Key = PublicKey;

    fn from_bytes(bytes: &[u8], pk: &Arc<PublicKey>) -> Result<Self> {
        let proto: CiphertextProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        Ciphertext::try_from_proto(&proto, pk)
    }
}

#[cfg(test)]
mod tests {
    use super::Ciphertext;
    use crate::paillier::{Plaintext, SecretKey};
    use crate::proto::Ciphertext as CiphertextProto;
    use crate::Error;
    use num_bigint::{BigInt, BigUint};
    use prost::Message;
    use rand::thread_rng;
    use std::error::Error as StdError;
    use veil_traits::{DeserializeWithKey, HomomorphicDecrypter, HomomorphicEncrypter, Serialize};

    #[test]
    fn add_sub() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let sk = SecretKey::random_for_tests(&mut rng);
        let pk = sk.public_key();
        let a = pk.try_encrypt(&Plaintext::from(10), &mut rng)?;
        let b = pk.try_encrypt(&Plaintext::from(20), &mut rng)?;

        assert_eq!(sk.try_decrypt(&a.try_add(&b)?)?.to_i64(), Some(30));
        assert_eq!(sk.try_decrypt(&a.try_sub(&b)?)?.to_i64(), Some(-10));
        assert_eq!(sk.try_decrypt(&b.try_sub(&a)?)?.to_i64(), Some(10));
        assert_eq!(sk.try_decrypt(&a.try_neg()?)?.to_i64(), Some(-10));
        assert!(sk.try_decrypt(&a.try_sub(&a)?)?.is_zero());
        Ok(())
    }

    #[test]
    fn mul_plain() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let sk = SecretKey::random_for_tests(&mut rng);
        let pk = sk.public_key();
        let a = pk.try_encrypt(&Plaintext::from(-7), &mut rng)?;
        assert_eq!(
            sk.try_decrypt(&a.try_mul_plain(&BigInt::from(6))?)?.to_i64(),
            Some(-42)
        );
        assert_eq!(
            sk.try_decrypt(&a.try_mul_plain(&BigInt::from(-3))?)?.to_i64(),
            Some(21)
        );
        assert!(sk.try_decrypt(&a.try_mul_plain(&BigInt::from(0))?)?.is_zero());
        Ok(())
    }

    #[test]
    fn exponent_alignment() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let sk = SecretKey::random_for_tests(&mut rng);
        let pk = sk.public_key();
        // 3 * 16^1 = 48
        let a = pk.try_encrypt(&Plaintext::new(3, 1), &mut rng)?;
        let b = pk.try_encrypt(&Plaintext::from(48), &mut rng)?;

        let lowered = a.decrease_exponent_to(0)?;
        assert_eq!(lowered.exponent(), 0);
        assert_eq!(sk.try_decrypt(&lowered)?.to_i64(), Some(48));
        assert!(a.decrease_exponent_to(2).is_err());

        let diff = a.try_sub(&b)?;
        assert_eq!(diff.exponent(), 0);
        assert!(sk.try_decrypt(&diff)?.is_zero());
        assert_eq!(sk.try_decrypt(&a.try_add(&b)?)?.to_i64(), Some(96));
        Ok(())
    }

    #[test]
    fn incompatible_keys() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let sk1 = SecretKey::random_for_tests(&mut rng);
        let sk2 = SecretKey::random_for_tests(&mut rng);
        let a = sk1.public_key().try_encrypt(&Plaintext::from(5), &mut rng)?;
        let b = sk2.public_key().try_encrypt(&Plaintext::from(5), &mut rng)?;

        assert_eq!(a.try_add(&b), Err(Error::IncompatibleKeys));
        assert_eq!(a.try_sub(&b), Err(Error::IncompatibleKeys));
        assert_eq!(b.try_sub(&a), Err(Error::IncompatibleKeys));
        Ok(())
    }

    #[test]
    fn new() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let sk = SecretKey::random_for_tests(&mut rng);
        let pk = sk.public_key();
        let a = pk.try_encrypt(&Plaintext::from(5), &mut rng)?;
        assert_eq!(Ciphertext::new(a.value().clone(), 0, pk)?, a);
        assert!(Ciphertext::new(BigUint::default(), 0, pk).is_err());
        assert!(Ciphertext::new(pk.n_squared().clone(), 0, pk).is_err());
        assert!(Ciphertext::new(pk.n().clone(), 0, pk).is_err());
        assert!(Ciphertext::new(pk.n() * 2u32, 0, pk).is_err());
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let sk = SecretKey::random_for_tests(&mut rng);
        let pk = sk.public_key();
        let ct = pk.try_encrypt(&Plaintext::new(-8, 3), &mut rng)?;
        let bytes = ct.to_bytes();

        let proto = CiphertextProto::decode(bytes.as_slice())?;
        assert_eq!(proto.version, 1);
        assert_eq!(proto.value.len(), pk.ciphertext_width());
        assert_eq!(proto.key_id.as_slice(), pk.key_id().as_slice());
        assert_eq!(proto.exponent, 3);

        let decoded = Ciphertext::from_bytes(&bytes, pk)?;
        assert_eq!(decoded, ct);
        assert_eq!(sk.try_decrypt(&decoded)?, Plaintext::new(-8, 3));

        let other = SecretKey::random_for_tests(&mut rng);
        assert_eq!(
            Ciphertext::from_bytes(&bytes, other.public_key()),
            Err(Error::IncompatibleKeys)
        );
        assert_eq!(
            Ciphertext::from_bytes(&bytes[..bytes.len() - 1], pk),
            Err(Error::SerializationError)
        );
        Ok(())
    }
}
