//! Favorited report paths over an injected key-value store
//!
//! Persistence is best-effort: a store that cannot be read starts the list
//! empty and a failed write is logged, never surfaced.

use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use super::error::ConsoleError;

pub const FAVORITES_KEY: &str = "ssrs-favorites";

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError>;
}

/// All keys in one JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ConsoleError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| ConsoleError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        // A corrupt file is replaced rather than blocking every write
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Discarding unreadable store {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&entries).map_err(|e| ConsoleError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ConsoleError::Storage("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ConsoleError::Storage("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct Favorites {
    store: Box<dyn KeyValueStore>,
    paths: Vec<String>,
}

impl Favorites {
    /// Load the saved list; unreadable storage yields an empty list
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let paths = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable favorites: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read favorites: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} favorites", paths.len());
        Self { store, paths }
    }

    pub fn list(&self) -> &[String] {
        &self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Returns false if the path was already a favorite
    pub fn add(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.paths.push(path.to_string());
        self.persist();
        true
    }

    /// Returns false if the path was not a favorite
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        let removed = before != self.paths.len();
        if removed {
            self.persist();
        }
        removed
    }

    /// Flip the favorite state; returns whether the path is now a favorite
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.remove(path) {
            false
        } else {
            self.add(path)
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.paths)
            .map_err(|e| ConsoleError::Storage(e.to_string()))
            .and_then(|raw| self.store.set(FAVORITES_KEY, &raw));
        if let Err(e) = result {
            warn!("Failed to save favorites: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shares one memory store between two `Favorites` instances
    struct SharedStore(Arc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
            self.0.set(key, value)
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, ConsoleError> {
            Err(ConsoleError::Storage("unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), ConsoleError> {
            Err(ConsoleError::Storage("unavailable".into()))
        }
    }

    #[test]
    fn test_toggle_and_persist() {
        let memory = Arc::new(MemoryStore::new());
        let mut favorites = Favorites::load(Box::new(SharedStore(memory.clone())));
        assert!(favorites.list().is_empty());

        assert!(favorites.toggle("/Sales/Revenue"));
        assert!(favorites.add("/Finance/Budget"));
        assert!(!favorites.add("/Finance/Budget"));
        assert!(!favorites.toggle("/Sales/Revenue"));

        assert_eq!(
            memory.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["/Finance/Budget"]"#)
        );

        let reloaded = Favorites::load(Box::new(SharedStore(memory)));
        assert_eq!(reloaded.list(), ["/Finance/Budget".to_string()]);
    }

    #[test]
    fn test_broken_store_is_best_effort() {
        let mut favorites = Favorites::load(Box::new(BrokenStore));
        assert!(favorites.add("/Sales/Revenue"));
        assert!(favorites.contains("/Sales/Revenue"));
        assert!(favorites.remove("/Sales/Revenue"));
    }

    #[test]
    fn test_corrupt_value_starts_empty() {
        let memory = MemoryStore::new();
        memory.set(FAVORITES_KEY, "{not json").unwrap();
        let favorites = Favorites::load(Box::new(memory));
        assert!(favorites.list().is_empty());
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("storage.json"));
        assert_eq!(store.get("missing").unwrap(), None);

        store.set(FAVORITES_KEY, "[]").unwrap();
        store.set("other", "value").unwrap();
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_json_file_store_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.get(FAVORITES_KEY), Err(ConsoleError::Storage(_))));
        store.set(FAVORITES_KEY, "[]").unwrap();
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
    }
}
