//! Modular arithmetic over prime fields.
//!
//! These routines are built on `num-bigint`, whose operations run in variable
//! time. They are used on share values, never on long-lived key material.

use crate::{Error, Result};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

fn check_modulus(modulus: &BigUint) -> Result<()> {
    if modulus.is_zero() {
        Err(Error::InvalidInput("Modulus must be non-zero".to_string()))
    } else {
        Ok(())
    }
}

/// Computes `base^exponent mod modulus`.
pub fn mod_exp(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    check_modulus(modulus)?;
    Ok(base.modpow(exponent, modulus))
}

/// Computes the multiplicative inverse of `a` modulo `modulus`.
///
/// Fails with [`Error::NotInvertible`] when `gcd(a, modulus) != 1`.
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    check_modulus(modulus)?;
    let a = a % modulus;
    if a.is_zero() {
        return Err(Error::NotInvertible);
    }
    a.modinv(modulus).ok_or(Error::NotInvertible)
}

/// Evaluates at `x = 0` the unique polynomial of degree `points.len() - 1`
/// passing through `points`, modulo the prime `modulus`.
///
/// The value at zero is the constant term of the polynomial. Two points with
/// the same abscissa make a denominator vanish and yield
/// [`Error::NotInvertible`].
pub fn lagrange_interpolate_at_zero(
    points: &[(BigUint, BigUint)],
    modulus: &BigUint,
) -> Result<BigUint> {
    check_modulus(modulus)?;
    if points.is_empty() {
        return Err(Error::InvalidInput(
            "Interpolation requires at least one point".to_string(),
        ));
    }

    let xs = points.iter().map(|(x, _)| x % modulus).collect::<Vec<_>>();
    let mut f0 = BigUint::zero();
    for (i, (_, yi)) in points.iter().enumerate() {
        let mut numerator = BigUint::one();
        let mut denominator = BigUint::one();
        for (j, xj) in xs.iter().enumerate() {
            if i == j {
                continue;
            }
            // (0 - x_j) and (x_i - x_j), kept in [0, modulus)
            numerator = numerator * ((modulus - xj) % modulus) % modulus;
            denominator = denominator * ((&xs[i] + modulus - xj) % modulus) % modulus;
        }
        let basis = numerator * mod_inverse(&denominator, modulus)? % modulus;
        f0 = (f0 + (yi % modulus) * basis) % modulus;
    }
    Ok(f0)
}

/// Samples a polynomial of degree `degree` with constant term `intercept`
/// and other coefficients uniformly random in `[0, modulus)`.
///
/// Coefficients are returned in ascending order of degree.
pub fn random_polynomial<R: RngCore + CryptoRng>(
    degree: usize,
    intercept: &BigUint,
    modulus: &BigUint,
    rng: &mut R,
) -> Result<Vec<BigUint>> {
    check_modulus(modulus)?;
    if intercept >= modulus {
        return Err(Error::InvalidInput(
            "Intercept must be smaller than the modulus".to_string(),
        ));
    }
    let mut coefficients = Vec::with_capacity(degree + 1);
    coefficients.push(intercept.clone());
    for _ in 0..degree {
        coefficients.push(rng.gen_biguint_below(modulus));
    }
    Ok(coefficients)
}

/// Evaluates a polynomial given by its ascending coefficients at `x`,
/// modulo `modulus`, using Horner's rule.
pub fn evaluate_polynomial(
    coefficients: &[BigUint],
    x: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint> {
    check_modulus(modulus)?;
    Ok(coefficients
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, c| (acc * x + c) % modulus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldModulus;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn inverse_small() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let p = BigUint::from(8191u32);
        let inv = mod_inverse(&BigUint::from(3u32), &p)?;
        assert_eq!((inv * 3u32) % &p, BigUint::one());

        assert_eq!(
            mod_inverse(&BigUint::from(4u32), &BigUint::from(8u32)),
            Err(Error::NotInvertible)
        );
        assert_eq!(mod_inverse(&p, &p), Err(Error::NotInvertible));
        assert!(mod_inverse(&BigUint::one(), &BigUint::zero()).is_err());
        Ok(())
    }

    #[test]
    fn exp_small() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let r = mod_exp(
            &BigUint::from(2u32),
            &BigUint::from(10u32),
            &BigUint::from(1000u32),
        )?;
        assert_eq!(r, BigUint::from(24u32));
        Ok(())
    }

    #[test]
    fn interpolate_line() -> std::result::Result<(), Box<dyn std::error::Error>> {
        // f(x) = 7 + 3x over 2^13 - 1
        let p = BigUint::from(8191u32);
        let points = [
            (BigUint::from(1u32), BigUint::from(10u32)),
            (BigUint::from(2u32), BigUint::from(13u32)),
        ];
        assert_eq!(
            lagrange_interpolate_at_zero(&points, &p)?,
            BigUint::from(7u32)
        );
        Ok(())
    }

    #[test]
    fn interpolate_duplicate_abscissa() {
        let p = BigUint::from(8191u32);
        let points = [
            (BigUint::from(1u32), BigUint::from(10u32)),
            (BigUint::from(1u32), BigUint::from(13u32)),
        ];
        assert_eq!(
            lagrange_interpolate_at_zero(&points, &p),
            Err(Error::NotInvertible)
        );
        assert!(lagrange_interpolate_at_zero(&[], &p).is_err());
    }

    #[test]
    fn horner() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let p = BigUint::from(127u32);
        let coeffs = [1u32, 2, 3].map(BigUint::from);
        // 1 + 2*5 + 3*25 = 86
        assert_eq!(
            evaluate_polynomial(&coeffs, &BigUint::from(5u32), &p)?,
            BigUint::from(86u32)
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn inverse_in_largest_field(a in 1u64..) {
            let p = FieldModulus::largest();
            let a = BigUint::from(a);
            let inv = mod_inverse(&a, p.value()).unwrap();
            prop_assert_eq!((a * inv) % p.value(), BigUint::one());
        }

        #[test]
        fn interpolation_recovers_intercept(seed: u64, degree in 0usize..8, intercept: u64) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p = FieldModulus::from_exponent(127).unwrap();
            let intercept = BigUint::from(intercept);
            let poly = random_polynomial(degree, &intercept, p.value(), &mut rng).unwrap();
            let points = (1..=degree as u32 + 1)
                .map(|x| {
                    let x = BigUint::from(x);
                    let y = evaluate_polynomial(&poly, &x, p.value()).unwrap();
                    (x, y)
                })
                .collect::<Vec<_>>();
            prop_assert_eq!(lagrange_interpolate_at_zero(&points, p.value()).unwrap(), intercept);
        }
    }
}
