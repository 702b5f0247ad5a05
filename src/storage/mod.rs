//! Persistence for timer settings and statistics.
//!
//! The timer treats storage as a plain key-value sink/source:
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   TimerEngine    │────▶│  TimerStorage    │ ← typed snapshots
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │  Store (trait)   │
//!                          ├──────────────────┤
//!                          │  FileStore       │ ← one JSON file per key
//!                          │  MemoryStore     │ ← tests
//!                          └──────────────────┘
//! ```

mod error;
mod file;
mod snapshot;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use error::StoreError;
pub use file::FileStore;
pub use snapshot::{TimerStats, TimerStorage, TodayFocus, SETTINGS_KEY, STATS_KEY, TODAY_KEY};

/// Key-value store that survives process restarts.
pub trait Store: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the value exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for testing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    should_fail: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "Mock failure"),
            });
        }
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert!(store.get("b").unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_failure() {
        let store = MemoryStore::new();
        store.set_should_fail(true);
        assert!(matches!(
            store.set("a", "1").unwrap_err(),
            StoreError::Write { .. }
        ));
        assert!(store.is_empty());
    }
}
