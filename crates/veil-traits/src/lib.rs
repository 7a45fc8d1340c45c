#![crate_name = "veil_traits"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Traits for the veil session store.

use rand::{CryptoRng, RngCore};
use std::sync::Arc;

/// Serialization.
pub trait Serialize {
    /// Serialize `Self` into a vector of bytes.
    fn to_bytes(&self) -> Vec<u8>;
}

/// Deserialization without context.
pub trait Deserialize
where
    Self: Sized,
{
    /// The type of error returned.
    type Error;

    /// Attempt to deserialize from a vector of bytes.
    fn try_deserialize(bytes: &[u8]) -> Result<Self, Self::Error>;
}

/// Deserialization of values that are only meaningful under a given key,
/// such as ciphertexts.
pub trait DeserializeWithKey
where
    Self: Sized,
{
    /// The type of error returned.
    type Error;

    /// The key type the value is bound to.
    type Key;

    /// Attempt to deserialize from a vector of bytes, binding the result to
    /// `key`.
    fn from_bytes(bytes: &[u8], key: &Arc<Self::Key>) -> Result<Self, Self::Error>;
}

/// Encrypt a plaintext into a ciphertext.
pub trait HomomorphicEncrypter<P, C> {
    /// The type of error returned.
    type Error;

    /// Try to encrypt a plaintext into a ciphertext.
    fn try_encrypt<R: RngCore + CryptoRng>(&self, pt: &P, rng: &mut R) -> Result<C, Self::Error>;
}

/// Decrypt a ciphertext into a plaintext.
pub trait HomomorphicDecrypter<P, C> {
    /// The type of error returned.
    type Error;

    /// Try to decrypt a ciphertext into a plaintext.
    fn try_decrypt(&self, ct: &C) -> Result<P, Self::Error>;
}

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum StorageError {
    /// The backend cannot be reached or initialized.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend accepted the request but failed to persist the data.
    #[error("Backend write error: {0}")]
    BackendWriteError(String),

    /// The backend failed to read data back.
    #[error("Backend read error: {0}")]
    BackendReadError(String),

    /// No data is stored under the locator.
    #[error("Locator not found: {0}")]
    NotFound(String),
}

/// Capability interface of a storage backend.
///
/// Backends are opaque byte stores. A locator returned by `upload` is only
/// meaningful to the backend that produced it. Timeouts and retries are the
/// backend's concern and surface as errors.
pub trait StorageBackend: Send + Sync {
    /// Store `data` on behalf of `session_id` and return its locator.
    fn upload(&self, session_id: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Retrieve the data stored under `locator`.
    fn download(&self, locator: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete the data stored under `locator`, returning whether anything
    /// was deleted.
    fn delete(&self, locator: &str) -> bool;

    /// List every locator held by the backend.
    fn list_all(&self) -> Vec<String>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn upload(&self, session_id: &str, data: &[u8]) -> Result<String, StorageError> {
        (**self).upload(session_id, data)
    }

    fn download(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
        (**self).download(locator)
    }

    fn delete(&self, locator: &str) -> bool {
        (**self).delete(locator)
    }

    fn list_all(&self) -> Vec<String> {
        (**self).list_all()
    }
}
