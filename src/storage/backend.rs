use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors raised by a [`StorageBackend`]
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: {size} bytes requested, quota is {quota} bytes")]
    QuotaExceeded { size: u64, quota: u64 },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Synchronous string key-value store, modelled on browser local storage.
///
/// Implementations must treat a missing key as `Ok(None)` on read and as a
/// successful no-op on removal.
#[cfg_attr(test, mockall::automock)]
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

fn check_quota(value: &str, quota_bytes: Option<u64>) -> Result<(), StorageError> {
    let size = value.len() as u64;
    match quota_bytes {
        Some(quota) if size > quota => Err(StorageError::QuotaExceeded { size, quota }),
        _ => Ok(()),
    }
}

/// Stores each key as `<key>.json` inside a data directory.
///
/// Writes go to a temporary sibling file first and are then renamed over the
/// target, so a failed write never leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: Utf8PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Arguments
    /// * `dir` - Directory that will hold one file per key
    /// * `quota_bytes` - Maximum size of a single value, `None` for unlimited
    pub fn open<P: AsRef<Utf8Path>>(dir: P, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        tracing::debug!("Opened file storage at {}", dir);
        Ok(Self { dir, quota_bytes })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<Utf8PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        check_quota(value, self.quota_bytes)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process backend. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            items: Mutex::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(value, self.quota_bytes)?;
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file_storage(quota: Option<u64>) -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().join("data")).unwrap();
        let storage = FileStorage::open(&dir, quota).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let (storage, _temp_dir) = create_test_file_storage(None);
        assert!(storage.dir().exists());
    }

    #[test]
    fn test_file_storage_set_get_remove() {
        let (storage, _temp_dir) = create_test_file_storage(None);

        assert_eq!(storage.get_item("questline_data").unwrap(), None);

        storage.set_item("questline_data", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.get_item("questline_data").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(!storage.dir().join("questline_data.json.tmp").exists());

        storage.remove_item("questline_data").unwrap();
        assert_eq!(storage.get_item("questline_data").unwrap(), None);

        // Removing a missing key is not an error
        storage.remove_item("questline_data").unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let (storage, _temp_dir) = create_test_file_storage(None);

        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.get_item(""),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_file_storage_quota_keeps_previous_value() {
        let (storage, _temp_dir) = create_test_file_storage(Some(8));

        storage.set_item("key", "small").unwrap();
        let result = storage.set_item("key", "much too large");

        assert!(matches!(
            result,
            Err(StorageError::QuotaExceeded { size: 14, quota: 8 })
        ));
        assert_eq!(storage.get_item("key").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_item("key", "value").unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get_item("key").unwrap().as_deref(), Some("value"));

        storage.remove_item("key").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(3);
        assert!(storage.set_item("key", "abc").is_ok());
        assert!(matches!(
            storage.set_item("key", "abcd"),
            Err(StorageError::QuotaExceeded { .. })
        ));
    }
}
