//! Storage backends.
//!
//! The set of backends is closed: a [`BackendConfig`] selects one variant of
//! [`Backend`] at construction, and every variant implements the
//! [`StorageBackend`] capability interface.

mod local;
mod memory;

pub use local::LocalDirectoryBackend;
pub use memory::MemoryBackend;
pub use veil_traits::{StorageBackend, StorageError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of a storage backend.
///
/// Deserializes from objects tagged by `type`, e.g.
/// `{"type": "local", "base_path": "/mnt/share"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// An in-memory backend.
    Memory,
    /// A directory on a local or mounted filesystem.
    Local {
        /// The directory holding the blobs.
        base_path: PathBuf,
    },
}

/// A configured storage backend.
#[derive(Debug)]
pub enum Backend {
    /// See [`MemoryBackend`].
    Memory(MemoryBackend),
    /// See [`LocalDirectoryBackend`].
    Local(LocalDirectoryBackend),
}

impl Backend {
    /// Instantiate the backend described by `config`.
    pub fn from_config(config: &BackendConfig) -> Result<Self, StorageError> {
        let backend = match config {
            BackendConfig::Memory => Backend::Memory(MemoryBackend::new()),
            BackendConfig::Local { base_path } => {
                Backend::Local(LocalDirectoryBackend::new(base_path.clone())?)
            }
        };
        log::info!("Configured {:?}", config);
        Ok(backend)
    }
}

impl StorageBackend for Backend {
    fn upload(&self, session_id: &str, data: &[u8]) -> Result<String, StorageError> {
        match self {
            Backend::Memory(b) => b.upload(session_id, data),
            Backend::Local(b) => b.upload(session_id, data),
        }
    }

    fn download(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
        match self {
            Backend::Memory(b) => b.download(locator),
            Backend::Local(b) => b.download(locator),
        }
    }

    fn delete(&self, locator: &str) -> bool {
        match self {
            Backend::Memory(b) => b.delete(locator),
            Backend::Local(b) => b.delete(locator),
        }
    }

    fn list_all(&self) -> Vec<String> {
        match self {
            Backend::Memory(b) => b.list_all(),
            Backend::Local(b) => b.list_all(),
        }
    }
}
