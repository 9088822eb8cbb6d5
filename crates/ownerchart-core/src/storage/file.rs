//! Chart blobs as JSON files in a data directory.

use super::{BlobStorage, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed blob store; key `k` lives in `<dir>/k.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open `dir`, creating it and any missing parents.
    pub fn new(dir: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Io(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// `ownerchart` under the platform's local data directory, falling back to
    /// the home directory.
    pub fn default_location() -> StorageResult<Self> {
        let root = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("no data or home directory".to_string()))?;
        Self::new(root.join("ownerchart"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(stem + ".json")
    }
}

impl BlobStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.blob_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(format!("cannot read {}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.blob_path(key);
        fs::write(&path, value)
            .map_err(|e| StorageError::Io(format!("cannot write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.blob_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(format!("cannot remove {}: {e}", path.display()))),
        }
    }
}
