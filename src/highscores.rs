//! Best-score persistence
//!
//! A single number stored under `highScore`, encoded as JSON so the value
//! stays readable in browser devtools.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError};

/// The best score seen across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highScore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Load from `store`, falling back to 0 when missing or unreadable
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let Some(raw) = store.get(Self::STORAGE_KEY) else {
            log::info!("No high score found, starting fresh");
            return Self::default();
        };

        match serde_json::from_str::<u64>(raw.trim()) {
            Ok(best) => {
                log::info!("Loaded high score {}", best);
                Self { best }
            }
            Err(err) => {
                log::warn!("Ignoring unreadable high score {:?}: {}", raw, err);
                Self::default()
            }
        }
    }

    /// Record `score`; returns true if it beat the previous best
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.best)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("High score saved ({})", self.best);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_load_missing_is_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store), HighScore::new(0));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        HighScore::new(2400).save(&mut store).unwrap();
        assert_eq!(store.get(HighScore::STORAGE_KEY).as_deref(), Some("2400"));
        assert_eq!(HighScore::load(&store).best, 2400);
    }

    #[test]
    fn test_load_garbage_is_zero() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "lots").unwrap();
        assert_eq!(HighScore::load(&store).best, 0);
        store.set(HighScore::STORAGE_KEY, "-5").unwrap();
        assert_eq!(HighScore::load(&store).best, 0);
    }

    #[test]
    fn test_submit_keeps_maximum() {
        let mut high = HighScore::new(500);
        assert!(!high.submit(300));
        assert!(!high.submit(500));
        assert_eq!(high.best, 500);
        assert!(high.submit(800));
        assert_eq!(high.best, 800);
    }
}
