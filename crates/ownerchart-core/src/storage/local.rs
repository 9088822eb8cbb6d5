//! Browser local storage implementation for WebAssembly.

use super::{BlobStorage, StorageError, StorageResult};

/// Blob storage backed by `window.localStorage`.
///
/// Not Send/Sync; WASM is single-threaded.
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Backend("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Backend(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Backend("localStorage not available".to_string()))
    }
}

impl BlobStorage for LocalStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)))
    }
}
