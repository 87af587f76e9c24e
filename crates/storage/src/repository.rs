use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::curriculum::CurriculumRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Logical keys of the persisted curriculum state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Sessions,
    Progress,
    /// Never written by the engine; cleared on reset so stale snapshots go away.
    Metrics,
    ErrorLogs,
}

impl StorageKey {
    pub const ALL: [Self; 4] = [Self::Sessions, Self::Progress, Self::Metrics, Self::ErrorLogs];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sessions => "fraction_comparison_sessions",
            Self::Progress => "fraction_comparison_progress",
            Self::Metrics => "fraction_comparison_metrics",
            Self::ErrorLogs => "fraction_comparison_error_logs",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value contract for persisted state.
///
/// Each call is atomic on its own; there is no multi-key transaction and the
/// last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn save(&self, key: StorageKey, value: Value) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<StorageKey, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn save(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Holds the active store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub store: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }

    #[must_use]
    pub fn curriculum(&self) -> CurriculumRepository {
        CurriculumRepository::new(Arc::clone(&self.store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn load_returns_last_write() {
        let store = InMemoryStore::new();
        assert_eq!(store.load(StorageKey::Progress).await.unwrap(), None);

        store.save(StorageKey::Progress, json!({"a": 1})).await.unwrap();
        store.save(StorageKey::Progress, json!({"a": 2})).await.unwrap();

        assert_eq!(
            store.load(StorageKey::Progress).await.unwrap(),
            Some(json!({"a": 2}))
        );
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryStore::new();
        store.save(StorageKey::Sessions, json!([])).await.unwrap();
        store.remove(StorageKey::Sessions).await.unwrap();
        store.remove(StorageKey::Sessions).await.unwrap();
        assert_eq!(store.load(StorageKey::Sessions).await.unwrap(), None);
    }

    #[test]
    fn keys_are_distinct() {
        let names: std::collections::HashSet<_> =
            StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), 4);
    }
}
