//! Process-local backend, used by tests and throwaway sessions.

use super::{BlobStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Blobs in a locked map; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StorageError::Backend(format!("poisoned lock: {e}")))?;
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Backend(format!("poisoned lock: {e}")))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Backend(format!("poisoned lock: {e}")))?;
        blobs.remove(key);
        Ok(())
    }
}
