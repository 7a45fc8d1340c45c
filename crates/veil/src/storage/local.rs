//! A storage backend over a local or mounted directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use veil_traits::{StorageBackend, StorageError};

const EXTENSION: &str = "session";
const TEMP_EXTENSION: &str = "tmp";

/// A storage backend writing one file per blob under a base directory,
/// typically a mounted network share.
///
/// Blobs are stored at `<base_path>/<locator>.session`, where the locator is
/// a random UUID.
#[derive(Debug, Clone)]
pub struct LocalDirectoryBackend {
    base_path: PathBuf,
}

impl LocalDirectoryBackend {
    /// Open the backend, creating `base_path` if needed.
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::BackendUnavailable(format!("{}: {}", base_path.display(), e))
        })?;
        Ok(Self { base_path })
    }

    /// Returns the base directory of the backend.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    // Only UUID locators map to a path, so a locator never escapes the base directory.
    fn path_of(&self, locator: &str) -> Option<PathBuf> {
        let id = Uuid::parse_str(locator).ok()?;
        Some(
            self.base_path
                .join(id.hyphenated().to_string())
                .with_extension(EXTENSION),
        )
    }

    /// Write `data` under `locator` through a temporary file, so a failed
    /// write never leaves a partial blob behind.
    fn store(&self, locator: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path_of(locator).ok_or_else(|| {
            StorageError::BackendWriteError(format!("Invalid locator {}", locator))
        })?;
        let tmp = path.with_extension(TEMP_EXTENSION);
        let written = fs::write(&tmp, data)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::BackendUnavailable(format!(
                    "{}: {}",
                    self.base_path.display(),
                    e
                )),
                _ => StorageError::BackendWriteError(format!("{}: {}", tmp.display(), e)),
            })
            .and_then(|_| {
                fs::rename(&tmp, &path).map_err(|e| {
                    StorageError::BackendWriteError(format!("{}: {}", path.display(), e))
                })
            });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(path)
    }
}

impl StorageBackend for LocalDirectoryBackend {
    fn upload(&self, session_id: &str, data: &[u8]) -> Result<String, StorageError> {
        let locator = Uuid::new_v4().to_string();
        let path = self.store(&locator, data)?;
        log::debug!(
            "Stored {} bytes of session {} at {}",
            data.len(),
            session_id,
            path.display()
        );
        Ok(locator)
    }

    fn download(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
        let path = self
            .path_of(locator)
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(locator.to_string()),
            _ => StorageError::BackendReadError(format!("{}: {}", path.display(), e)),
        })
    }

    fn delete(&self, locator: &str) -> bool {
        match self.path_of(locator) {
            Some(path) => fs::remove_file(path).is_ok(),
            None => false,
        }
    }

    fn list_all(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot list {}: {}", self.base_path.display(), e);
                return vec![];
            }
        };
        let mut locators = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|stem| Uuid::parse_str(stem).is_ok())
            .collect::<Vec<_>>();
        locators.sort();
        locators
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::LocalDirectoryBackend;
    use std::error::Error;
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;
    use veil_traits::{StorageBackend, StorageError};

    /// A fresh directory under the system temporary directory.
    pub(crate) fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("veil-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn upload_download_delete() -> Result<(), Box<dyn Error>> {
        let dir = temp_dir();
        let backend = LocalDirectoryBackend::new(dir.join("nested"))?;
        let blob = vec![0u8, 1, 2, 255];
        let locator = backend.upload("s1", &blob)?;
        assert!(dir.join("nested").join(format!("{}.session", locator)).exists());
        assert_eq!(backend.download(&locator)?, blob);

        fs::write(backend.base_path().join("stray.txt"), b"ignored")?;
        fs::write(backend.base_path().join("stray.session"), b"ignored")?;
        let other = backend.upload("s2", b"")?;
        let mut expected = vec![locator.clone(), other];
        expected.sort();
        assert_eq!(backend.list_all(), expected);

        assert!(backend.delete(&locator));
        assert!(!backend.delete(&locator));
        assert_eq!(
            backend.download(&locator),
            Err(StorageError::NotFound(locator))
        );
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[test]
    fn failed_upload_leaves_nothing() -> Result<(), Box<dyn Error>> {
        let dir = temp_dir();
        let backend = LocalDirectoryBackend::new(&dir)?;

        // The rename fails onto an existing non-empty directory.
        let locator = Uuid::new_v4().to_string();
        let blocker = dir.join(format!("{}.session", locator));
        fs::create_dir_all(blocker.join("inner"))?;
        assert!(matches!(
            backend.store(&locator, b"blob"),
            Err(StorageError::BackendWriteError(_))
        ));
        assert!(!dir.join(format!("{}.tmp", locator)).exists());
        assert!(backend.list_all().is_empty());

        fs::remove_dir_all(&dir)?;
        assert!(matches!(
            backend.upload("s1", b"blob"),
            Err(StorageError::BackendUnavailable(_))
        ));
        fs::create_dir_all(&dir)?;
        assert!(backend.list_all().is_empty());
        assert_eq!(fs::read_dir(&dir)?.count(), 0);
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[test]
    fn rejects_foreign_locators() -> Result<(), Box<dyn Error>> {
        let dir = temp_dir();
        let backend = LocalDirectoryBackend::new(&dir)?;
        for locator in ["../etc/passwd", "", "not-a-uuid"] {
            assert_eq!(
                backend.download(locator),
                Err(StorageError::NotFound(locator.to_string()))
            );
            assert!(!backend.delete(locator));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[test]
    fn unavailable_base_path() -> Result<(), Box<dyn Error>> {
        let dir = temp_dir();
        fs::create_dir_all(&dir)?;
        let file = dir.join("file");
        fs::write(&file, b"")?;
        assert!(matches!(
            LocalDirectoryBackend::new(file.join("sub")),
            Err(StorageError::BackendUnavailable(_))
        ));
        fs::remove_dir_all(dir)?;
        Ok(())
    }
}
