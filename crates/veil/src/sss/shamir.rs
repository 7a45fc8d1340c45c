/// Shamir Secret Sharing of byte strings.
///
/// This module splits a byte string into `n` shares such that any `threshold`
/// of them reconstruct it exactly, while fewer reveal nothing about it.
use crate::sss::config::validate_threshold_config;
use crate::sss::encoding::{decode_chunk, encode_secret};
use crate::sss::traits::SecretSharer;
use crate::sss::{Share, SharePoint};
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::BigUint;
use rand::{thread_rng, CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use std::collections::BTreeSet;
use veil_util::{evaluate_polynomial, lagrange_interpolate_at_zero, random_polynomial, select_modulus};

/// Shamir Secret Sharing over a Mersenne prime field.
///
/// The field modulus is selected per split as the smallest table prime
/// exceeding every encoded chunk and the number of shares, and is stored in
/// each share. Arithmetic relies on `num-bigint` and is not constant time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShamirSecretSharing {
    /// Number of shares
    pub n: usize,
    /// Threshold for reconstruction
    pub threshold: usize,
}

impl ShamirSecretSharing {
    /// Create a new Shamir Secret Sharing instance.
    ///
    /// Fails with [`Error::InvalidThreshold`] unless `2 <= threshold <= n`.
    pub fn new(threshold: usize, n: usize) -> Result<Self> {
        validate_threshold_config(threshold, n)?;
        Ok(Self { n, threshold })
    }

    /// Split `secret` into `n` shares; share `i` holds the points at `x = i + 1`.
    pub fn split<R: RngCore + CryptoRng>(&self, secret: &[u8], rng: &mut R) -> Result<Vec<Share>> {
        let chunks = encode_secret(secret);
        let n = BigUint::from(self.n);
        let modulus = select_modulus(chunks.iter().chain(std::iter::once(&n)))?;
        let p = modulus.value();
        let xs = (1..=self.n).map(BigUint::from).collect_vec();

        // Generate seeds deterministically from the input RNG
        let seeds: Vec<<ChaCha20Rng as SeedableRng>::Seed> =
            (0..chunks.len()).map(|_| rng.gen()).collect();

        // rows = chunks, columns = parties
        let evaluations = chunks
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(chunk, seed)| -> Result<Vec<BigUint>> {
                let mut rng = ChaCha20Rng::from_seed(*seed);
                let poly = random_polynomial(self.threshold - 1, chunk, p, &mut rng)?;
                xs.iter()
                    .map(|x| evaluate_polynomial(&poly, x, p).map_err(Error::from))
                    .collect()
            })
            .collect::<Result<Vec<_>>>()?;

        log::trace!(
            "Split a secret of {} chunks into {} shares (threshold {}, field 2^{} - 1)",
            chunks.len(),
            self.n,
            self.threshold,
            modulus.exponent()
        );

        (0..self.n)
            .map(|i| {
                let points = evaluations
                    .iter()
                    .map(|row| SharePoint {
                        x: i + 1,
                        y: row[i].clone(),
                    })
                    .collect();
                Share::new(modulus.clone(), self.threshold, points)
            })
            .collect()
    }

    /// Reconstruct a secret from its shares.
    ///
    /// The field modulus and threshold are read from the shares, which must
    /// agree on them. Fails with [`Error::InsufficientShares`] when fewer than
    /// two, or fewer than the threshold, are supplied.
    pub fn reconstruct(shares: &[Share]) -> Result<Vec<u8>> {
        if shares.len() < 2 {
            return Err(Error::insufficient_shares(shares.len(), 2));
        }
        let first = &shares[0];
        if !shares.iter().map(|s| (&s.modulus, s.threshold, s.points.len())).all_equal() {
            return Err(Error::malformed_share(
                "shares disagree on field modulus, threshold or length",
            ));
        }
        if shares.len() < first.threshold {
            return Err(Error::insufficient_shares(shares.len(), first.threshold));
        }
        let xs = shares.iter().map(|s| s.x()).collect::<BTreeSet<_>>();
        if xs.len() != shares.len() {
            return Err(Error::malformed_share("duplicate share abscissa"));
        }

        let used = &shares[..first.threshold];
        let p = first.modulus.value();
        let mut secret = Vec::with_capacity(first.points.len() * super::CHUNK_BYTES);
        for c in 0..first.points.len() {
            let points = used
                .iter()
                .map(|s| (BigUint::from(s.points[c].x), s.points[c].y.clone()))
                .collect_vec();
            let value = lagrange_interpolate_at_zero(&points, p)?;
            secret.extend(decode_chunk(&value)?);
        }
        Ok(secret)
    }
}

impl SecretSharer for ShamirSecretSharing {
    fn split_secret<R: RngCore + CryptoRng>(&self, secret: &[u8], rng: &mut R) -> Result<Vec<Share>> {
        self.split(secret, rng)
    }

    fn reconstruct_secret(&self, shares: &[Share]) -> Result<Vec<u8>> {
        if let Some(share) = shares.iter().find(|s| s.threshold != self.threshold) {
            return Err(Error::malformed_share(format!(
                "share threshold {} differs from {}",
                share.threshold, self.threshold
            )));
        }
        Self::reconstruct(shares)
    }
}

/// Split `secret` into `n` shares, any `threshold` of which reconstruct it.
pub fn split(secret: &[u8], threshold: usize, n: usize) -> Result<Vec<Share>> {
    ShamirSecretSharing::new(threshold, n)?.split(secret, &mut thread_rng())
}

/// Reconstruct a secret from at least a threshold of its shares.
pub fn reconstruct(shares: &[Share]) -> Result<Vec<u8>> {
    ShamirSecretSharing::reconstruct(shares)
}
