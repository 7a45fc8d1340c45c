//! Replicated and sharded placement of blobs over storage backends.

use crate::sss::{ShamirSecretSharing, Share};
use crate::storage::{Backend, BackendConfig};
use crate::{Error, Result};
use itertools::Itertools;
use rand::thread_rng;
use rayon::prelude::*;
use veil_traits::{Deserialize, Serialize, StorageBackend, StorageError};

/// Distributes session blobs over an ordered set of storage backends.
///
/// Locator `i` of every returned or accepted locator list belongs to backend
/// `i`. Uploads are issued to all backends concurrently and the manager waits
/// for every outcome. Nothing is retried and partial uploads are not rolled
/// back; see [`Error::ReplicationPartialFailure`].
#[derive(Debug)]
pub struct ReplicationManager<B: StorageBackend = Backend> {
    backends: Vec<B>,
}

impl ReplicationManager<Backend> {
    /// Create a manager over the backends described by `configs`, in order.
    pub fn from_configs(configs: &[BackendConfig]) -> Result<Self> {
        let backends = configs
            .iter()
            .map(Backend::from_config)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(backends)
    }
}

impl<B: StorageBackend> ReplicationManager<B> {
    /// Create a manager over `backends`, in order.
    pub fn new(backends: Vec<B>) -> Result<Self> {
        if backends.is_empty() {
            return Err(Error::invalid_parameter("at least one backend is required"));
        }
        Ok(Self { backends })
    }

    /// Returns the backends, in order.
    pub fn backends(&self) -> &[B] {
        &self.backends
    }

    /// Upload `blobs[i]` to backend `i`, concurrently.
    fn upload_all(&self, session_id: &str, blobs: &[&[u8]]) -> Result<Vec<String>> {
        let outcomes = self
            .backends
            .par_iter()
            .zip(blobs.par_iter())
            .map(|(backend, blob)| backend.upload(session_id, blob))
            .collect::<Vec<_>>();

        let total = outcomes.len();
        let mut uploaded = vec![];
        let mut failures = vec![];
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(locator) => {
                    log::debug!("Session {} uploaded to backend {}", session_id, i);
                    uploaded.push((i, locator));
                }
                Err(e) => {
                    log::warn!("Session {} failed to upload to backend {}: {}", session_id, i, e);
                    failures.push((i, e));
                }
            }
        }

        if failures.is_empty() {
            Ok(uploaded.into_iter().map(|(_, locator)| locator).collect())
        } else {
            log::error!(
                "Session {} failed to upload to {} of {} backends",
                session_id,
                failures.len(),
                total
            );
            Err(Error::ReplicationPartialFailure {
                uploaded,
                failures,
                total,
            })
        }
    }

    /// Upload a full copy of `blob` to every backend.
    ///
    /// Returns one locator per backend. If any upload fails, the call fails
    /// with [`Error::ReplicationPartialFailure`], which carries the locators of
    /// the successful uploads.
    pub fn replicate_upload(&self, session_id: &str, blob: &[u8]) -> Result<Vec<String>> {
        let blobs = vec![blob; self.backends.len()];
        self.upload_all(session_id, &blobs)
    }

    /// Split `blob` into one share per backend, any `threshold` of which
    /// reconstruct it, and upload share `i` to backend `i`.
    ///
    /// Failures are reported as in [`ReplicationManager::replicate_upload`].
    pub fn shard_upload(&self, session_id: &str, blob: &[u8], threshold: usize) -> Result<Vec<String>> {
        let sss = ShamirSecretSharing::new(threshold, self.backends.len())?;
        let shares = sss
            .split(blob, &mut thread_rng())?
            .iter()
            .map(|share| share.to_bytes())
            .collect_vec();
        let blobs = shares.iter().map(Vec::as_slice).collect_vec();
        self.upload_all(session_id, &blobs)
    }

    fn check_locators(&self, locators: &[String]) -> Result<()> {
        if locators.len() != self.backends.len() {
            return Err(Error::UnspecifiedInput(format!(
                "Expected {} locators, got {}",
                self.backends.len(),
                locators.len()
            )));
        }
        Ok(())
    }

    /// Download a fully replicated blob, returning the first copy served.
    ///
    /// Backends are tried in order; the error of the last backend is
    /// returned if none serves the blob.
    pub fn replica_download(&self, locators: &[String]) -> Result<Vec<u8>> {
        self.check_locators(locators)?;
        let mut last_error = StorageError::BackendUnavailable("no backend".to_string());
        for (i, (backend, locator)) in self.backends.iter().zip(locators).enumerate() {
            match backend.download(locator) {
                Ok(blob) => return Ok(blob),
                Err(e) => {
                    log::warn!("Backend {} failed to serve {}: {}", i, locator, e);
                    last_error = e;
                }
            }
        }
        Err(last_error.into())
    }

    /// Download shares of a sharded blob until the threshold is met and
    /// reconstruct it.
    ///
    /// Backends that fail to serve a share are skipped. Fails with
    /// [`Error::InsufficientShares`] if fewer than a threshold of shares are
    /// obtained.
    pub fn shard_download(&self, locators: &[String]) -> Result<Vec<u8>> {
        self.check_locators(locators)?;
        let mut shares: Vec<Share> = vec![];
        for (i, (backend, locator)) in self.backends.iter().zip(locators).enumerate() {
            if shares.first().is_some_and(|s| shares.len() >= s.threshold()) {
                break;
            }
            let share = backend
                .download(locator)
                .map_err(Error::from)
                .and_then(|bytes| Share::try_deserialize(&bytes));
            match share {
                Ok(share) => shares.push(share),
                Err(e) => log::warn!("Backend {} failed to serve share {}: {}", i, locator, e),
            }
        }

        let required = shares.first().map_or(2, |s| s.threshold());
        if shares.len() < required {
            return Err(Error::insufficient_shares(shares.len(), required));
        }
        log::debug!("Reconstructing from {} shares", shares.len());
        ShamirSecretSharing::reconstruct(&shares)
    }

    /// Delete `locators[i]` from backend `i`, returning the outcome of each
    /// deletion. Used to clean up after a partial failure.
    pub fn delete_all(&self, locators: &[Option<String>]) -> Vec<bool> {
        self.backends
            .par_iter()
            .zip(locators.par_iter())
            .map(|(backend, locator)| locator.as_deref().is_some_and(|l| backend.delete(l)))
            .collect()
    }
}
