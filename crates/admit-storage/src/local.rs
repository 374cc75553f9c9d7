//! Local disk storage backend

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Local disk storage backend
///
/// Mirrors the object namespace below a base directory:
/// `/store/data/f.root` lives at `<base_path>/store/data/f.root`.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path)?;

        info!("Initialized local storage at {:?}", base_path);

        Ok(Self { base_path })
    }

    /// Base directory of this storage
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));

        let mut resolved = self.base_path.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(path.to_string())),
            }
        }

        Ok(resolved)
    }
}

impl StorageBackend for LocalStorage {
    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let path = self.object_path(path)?;
        Ok(path.is_file())
    }

    fn size(&self, path: &str) -> Result<u64, StorageError> {
        let object = self.object_path(path)?;
        debug!("Stat object at {:?}", object);

        let metadata = fs::metadata(&object).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(metadata.len())
    }
}
