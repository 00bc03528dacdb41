//! Key-value storage for cached lists and the report history.
//!
//! Values are JSON strings. `FileStore` keeps one file per key under a data
//! directory; `MemoryStore` backs tests and ephemeral runs.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// String key-value store shared between the UI thread and worker threads.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Read and decode a JSON value. An undecodable value is a `Decode` error.
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>, AppError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| AppError::decode(format!("Corrupt store entry '{key}': {e}")))
}

/// Encode and write a JSON value.
pub fn write_json<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| AppError::storage(format!("Failed to serialize '{key}': {e}")))?;
    store.set(key, &raw)
}

/// Write `path` through a sibling `.tmp` file and rename it into place.
///
/// On any failure the temp file is removed and `path` is left as it was.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), AppError>,
{
    let tmp = tmp_path(path);
    let result = write_then_rename(&tmp, path, write);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_then_rename<F>(tmp: &Path, path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), AppError>,
{
    let file = File::create(tmp)
        .map_err(|e| AppError::storage(format!("Failed to create '{}': {e}", tmp.display())))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .map_err(|e| AppError::storage(format!("Failed to flush '{}': {e}", tmp.display())))?;
    drop(writer);
    fs::rename(tmp, path)
        .map_err(|e| AppError::storage(format!("Failed to replace '{}': {e}", path.display())))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// One JSON file per key in a directory.
pub struct FileStore {
    dir: PathBuf,
    // Serializes write + rename so concurrent writers never interleave.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::storage(format!("Failed to create data dir '{}': {e}", dir.display())))?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::storage("Store lock poisoned."))?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::storage(format!("Failed to read '{}': {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::storage("Store lock poisoned."))?;
        let path = self.path_for(key);
        write_atomic(&path, |w| {
            w.write_all(value.as_bytes())
                .map_err(|e| AppError::storage(format!("Failed to write '{}': {e}", path.display())))
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::storage("Store lock poisoned."))?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage(format!("Failed to remove '{}': {e}", path.display()))),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::storage("Store lock poisoned."))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::storage("Store lock poisoned."))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::storage("Store lock poisoned."))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("list_cache.locations").unwrap(), None);
        store.set("list_cache.locations", "[\"a\"]").unwrap();
        assert_eq!(store.get("list_cache.locations").unwrap().as_deref(), Some("[\"a\"]"));
        assert!(store.dir().join("list_cache.locations.json").exists());

        store.remove("list_cache.locations").unwrap();
        assert_eq!(store.get("list_cache.locations").unwrap(), None);
        // Removing a missing key is fine.
        store.remove("list_cache.locations").unwrap();
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../escape", "1").unwrap();
        assert!(dir.path().join(".._escape.json").exists());
    }

    #[test]
    fn failed_atomic_write_leaves_no_temp_file_and_keeps_the_old_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homeprice_reports.json");
        std::fs::write(&path, "[]").unwrap();

        let err = write_atomic(&path, |w| {
            w.write_all(b"[{\"half").unwrap();
            Err(AppError::storage("disk full"))
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["homeprice_reports.json".to_string()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn atomic_write_replaces_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_atomic(&path, |w| {
            w.write_all(b"{}").map_err(|e| AppError::storage(e.to_string()))
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!dir.path().join("out.json.tmp").exists());
    }

    #[test]
    fn read_json_reports_corrupt_values_as_decode_errors() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        let err = read_json::<Vec<String>>(&store, "k").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
