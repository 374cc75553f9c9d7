//! Storage backend trait

use crate::error::StorageError;

/// Storage backend trait
///
/// The host cache hands an implementation of this trait to every admission
/// decision. Paths are normalized object paths such as `/store/data/f.root`.
pub trait StorageBackend: Send + Sync {
    /// Check if an object is resident
    fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Get the size of a resident object
    fn size(&self, path: &str) -> Result<u64, StorageError>;
}
