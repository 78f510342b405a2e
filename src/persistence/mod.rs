//! Save/load persistence
//!
//! Features:
//! - Key-value store with in-memory and one-file-per-key backends
//! - Versioned JSON snapshot of the in-flight match (`"match"`)
//! - Saved roster for *Load Game* (`"game"`)
//! - Atomic file writes (tmp → save)

pub mod save;
pub mod snapshot;

pub use save::{SaveGame, SavedOpponent};
pub use snapshot::{DieSnapshot, MatchSnapshot};

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Persistent string blobs by key
pub trait KeyValueStore {
    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistenceError>;

    /// Stored blob, or `None` if missing or unreadable
    fn load(&self, key: &str) -> Option<String>;

    fn remove(&mut self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.load(key).is_some()
    }
}

/// Store that forgets everything on exit
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        let path = self.path(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Option<String> {
        let path = match self.path(key) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("{e}");
                return None;
            }
        };
        match fs::read_to_string(&path) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                None
            }
        }
    }

    fn remove(&mut self, key: &str) {
        let Ok(path) = self.path(key) else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("match"), None);
        store.save("match", "{}").unwrap();
        assert!(store.contains("match"));
        store.remove("match");
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("saves")).unwrap();

        store.save("game", r#"{"player_money":5}"#).unwrap();
        assert_eq!(store.load("game").as_deref(), Some(r#"{"player_money":5}"#));
        assert!(dir.path().join("saves/game.json").exists());
        assert!(!dir.path().join("saves/game.json.tmp").exists());

        store.save("game", "{}").unwrap();
        assert_eq!(store.load("game").as_deref(), Some("{}"));

        store.remove("game");
        store.remove("game");
        assert_eq!(store.load("game"), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.save("../escape", "x"),
            Err(PersistenceError::InvalidKey(_))
        ));
        assert_eq!(store.load("a/b"), None);
    }
}
