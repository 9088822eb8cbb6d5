//! Persistence backends.
//!
//! Charts and preferences are stored as JSON strings under fixed keys in a
//! key-value backend.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use thiserror::Error;

/// Key of the chart blob (`{entities, connections}`).
pub const CHART_KEY: &str = "ownershipData";

/// Key of the snap preference (JSON boolean).
pub const SNAP_PREFERENCE_KEY: &str = "snapToAlignment";

/// Failure reading or writing a blob.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("malformed blob: {0}")]
    Serialization(String),
    #[error("i/o failure: {0}")]
    Io(String),
    #[error("backend unavailable: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for key-value blob backends.
///
/// Implementations can keep blobs in memory, in files, or in the browser's
/// local storage. Access is synchronous; every store mutation writes through.
pub trait BlobStorage {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the blob under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// True when `get` would return a blob.
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: BlobStorage + ?Sized> BlobStorage for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Read the snap preference. Missing or unreadable values mean enabled.
pub fn load_snap_enabled(storage: &impl BlobStorage) -> bool {
    match storage.get(SNAP_PREFERENCE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed snap preference {raw:?}: {e}");
            true
        }),
        Ok(None) => true,
        Err(e) => {
            log::warn!("Failed to read snap preference: {e}");
            true
        }
    }
}

/// Persist the snap preference.
pub fn save_snap_enabled(storage: &impl BlobStorage, enabled: bool) -> StorageResult<()> {
    let json = serde_json::to_string(&enabled).map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.set(SNAP_PREFERENCE_KEY, &json)
}
