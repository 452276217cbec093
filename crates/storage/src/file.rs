use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::kv::{KeyValueStore, StorageError};

/// Directory-backed store: one `<key>.json` file per key.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a half-written value.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/cloudkitchen` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("cloudkitchen"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_err(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(key, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| io_err(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err(key, e))?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cloudkitchen-file-store-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn absent_key_reads_as_none() {
        let store = FileKeyValueStore::new(scratch_dir("absent"));
        assert_eq!(store.get("cloudKitchenBills").unwrap(), None);
        store.remove("cloudKitchenBills").unwrap();
    }

    #[test]
    fn set_creates_directory_and_overwrites() {
        let dir = scratch_dir("overwrite");
        let store = FileKeyValueStore::new(&dir);

        store.set("cloudKitchenBills", "{}").unwrap();
        store.set("cloudKitchenBills", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("cloudKitchenBills").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.join("cloudKitchenBills.json").exists());
        assert!(!dir.join("cloudKitchenBills.json.tmp").exists());

        store.remove("cloudKitchenBills").unwrap();
        assert_eq!(store.get("cloudKitchenBills").unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let store = FileKeyValueStore::new("/data");
        assert_eq!(store.path_for("../evil key"), PathBuf::from("/data/___evil_key.json"));
    }
}
