//! Key-value persistence
//!
//! The game only ever stores a handful of strings (the best score), so the
//! backends are deliberately small:
//! - `MemoryStore` for tests and throwaway sessions
//! - `FileStore`, a JSON object on disk (native)
//! - `LocalStorage`, the browser's `window.localStorage` (wasm)

use std::collections::HashMap;

use thiserror::Error;

/// Storage failures. Reads never fail; a missing or unreadable value is `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode store contents: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage rejected write to {key:?}")]
    Rejected { key: String },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{KeyValueStore, StoreError};

    /// String map persisted as a JSON object, rewritten on every `set`
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
        values: BTreeMap<String, String>,
    }

    impl FileStore {
        /// Open `path`, starting empty if it is missing or unreadable
        pub fn open(path: impl AsRef<Path>) -> Self {
            let path = path.as_ref().to_path_buf();
            let values = match fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(values) => values,
                    Err(err) => {
                        log::warn!("Ignoring corrupt store {}: {}", path.display(), err);
                        BTreeMap::new()
                    }
                },
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
                Err(err) => {
                    log::warn!("Could not read store {}: {}", path.display(), err);
                    BTreeMap::new()
                }
            };
            Self { path, values }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.values.insert(key.to_string(), value.to_string());
            let json = serde_json::to_string_pretty(&self.values)?;
            fs::write(&self.path, json)?;
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{KeyValueStore, StoreError};

    /// `window.localStorage`
    #[derive(Debug, Clone, Default)]
    pub struct LocalStorage {
        storage: Option<web_sys::Storage>,
    }

    impl LocalStorage {
        pub fn new() -> Self {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten();
            if storage.is_none() {
                log::warn!("LocalStorage unavailable, scores will not persist");
            }
            Self { storage }
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.storage.as_ref()?.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|_| StoreError::Rejected {
                    key: key.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("highScore"), None);
        store.set("highScore", "1200").unwrap();
        assert_eq!(store.get("highScore").as_deref(), Some("1200"));
        store.set("highScore", "1300").unwrap();
        assert_eq!(store.get("highScore").as_deref(), Some("1300"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "cloud-hop-store-{}-{}.json",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_file(&path);

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("highScore"), None);
        store.set("highScore", "700").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("highScore").as_deref(), Some("700"));
        assert_eq!(reopened.path(), path.as_path());

        let _ = std::fs::remove_file(&path);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let path = std::env::temp_dir().join(format!(
            "cloud-hop-corrupt-{}-{}.json",
            std::process::id(),
            line!()
        ));
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("highScore"), None);

        let _ = std::fs::remove_file(&path);
    }
}
