//! An in-process storage backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;
use veil_traits::{StorageBackend, StorageError};

/// A storage backend keeping blobs in memory.
///
/// Mostly useful for tests and for single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn upload(&self, _session_id: &str, data: &[u8]) -> Result<String, StorageError> {
        let locator = Uuid::new_v4().to_string();
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(locator.clone(), data.to_vec());
        Ok(locator)
    }

    fn download(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locator)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))
    }

    fn delete(&self, locator: &str) -> bool {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(locator)
            .is_some()
    }

    fn list_all(&self) -> Vec<String> {
        let mut locators = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        locators.sort();
        locators
    }
}
