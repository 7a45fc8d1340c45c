/// Traits for secret sharing operations.
use crate::sss::Share;
use crate::Error;
use rand::{CryptoRng, RngCore};

/// Trait for splitting a secret into shares and reconstructing it.
pub trait SecretSharer {
    /// Split `secret` into shares, one per party.
    fn split_secret<R: RngCore + CryptoRng>(
        &self,
        secret: &[u8],
        rng: &mut R,
    ) -> Result<Vec<Share>, Error>;

    /// Reconstruct the secret from at least a threshold of shares.
    fn reconstruct_secret(&self, shares: &[Share]) -> Result<Vec<u8>, Error>;
}
