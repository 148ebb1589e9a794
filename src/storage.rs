use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::warn;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};

/// Stand-in for the browser's localStorage: a flat string-to-string map
/// with synchronous reads and writes.
///
/// Interior mutability is part of the contract so callers can share one
/// backend between the secure store and the plain UI flags.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str);
    /// All keys currently present, in insertion order.
    fn keys(&self) -> Vec<String>;
}

/// In-memory backend for tests and embedded harnesses.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<IndexMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.entries.write().shift_remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

/// JSON-file-backed storage for desktop harness deployments.
///
/// The whole map is rewritten on every mutation; per the event-driven model
/// there is never a concurrent writer, so no locking beyond the in-process
/// one is needed.
pub struct FileBackend {
    path: PathBuf,
    entries: RwLock<IndexMap<String, String>>,
}

impl FileBackend {
    pub fn open(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(serde_json::Value::Object(map)) => map
                    .into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                    .collect(),
                _ => {
                    warn!("⚠️ Storage file {} is not a JSON object, starting empty", path.display());
                    IndexMap::new()
                }
            },
            Err(_) => IndexMap::new(),
        };

        FileBackend {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        }
    }

    fn persist(&self) -> Result<()> {
        let entries = self.entries.read();
        let mut map = serde_json::Map::new();
        for (k, v) in entries.iter() {
            map.insert(k.clone(), serde_json::Value::String(v.clone()));
        }
        let body = serde_json::to_string_pretty(&serde_json::Value::Object(map))?;
        fs::write(&self.path, body).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove_item(&self, key: &str) {
        self.entries.write().shift_remove(key);
        if let Err(e) = self.persist() {
            warn!("⚠️ Failed to persist storage file after remove: {}", e);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_round_trips_and_orders_keys() {
        let backend = MemoryBackend::new();
        backend.set_item("b", "2").unwrap();
        backend.set_item("a", "1").unwrap();
        assert_eq!(backend.get_item("b").as_deref(), Some("2"));
        assert_eq!(backend.keys(), vec!["b".to_string(), "a".to_string()]);

        backend.remove_item("b");
        assert_eq!(backend.get_item("b"), None);
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn file_backend_survives_reopen() {
        let path = std::env::temp_dir().join(format!("riskassess-store-{}.json", rand::random::<u64>()));

        {
            let backend = FileBackend::open(&path);
            backend.set_item("segment_1", "{\"seg1_q1\":\"2\"}").unwrap();
            backend.set_item("notes", "follow up next week").unwrap();
        }

        let reopened = FileBackend::open(&path);
        assert_eq!(
            reopened.get_item("segment_1").as_deref(),
            Some("{\"seg1_q1\":\"2\"}")
        );
        assert_eq!(reopened.keys().len(), 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_backend_starts_empty_on_garbage() {
        let path = std::env::temp_dir().join(format!("riskassess-bad-{}.json", rand::random::<u64>()));
        fs::write(&path, "not json at all").unwrap();

        let backend = FileBackend::open(&path);
        assert!(backend.keys().is_empty());

        let _ = fs::remove_file(&path);
    }
}
