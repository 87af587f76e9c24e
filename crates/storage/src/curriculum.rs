//! Typed access to the persisted curriculum state on top of a `KeyValueStore`.

use std::sync::Arc;

use fraction_core::model::{ErrorLog, Progress, Session};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{KeyValueStore, StorageError, StorageKey};

/// Loads and saves progress, session history and the error log.
///
/// Values are stored as JSON documents under fixed keys. Collections are
/// rewritten whole on every change.
#[derive(Clone)]
pub struct CurriculumRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CurriculumRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored progress, or the default record if none has been saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the document is malformed.
    pub async fn load_progress(&self) -> Result<Progress, StorageError> {
        Ok(self.load(StorageKey::Progress).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub async fn save_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        self.save(StorageKey::Progress, progress).await
    }

    /// All session attempts in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the document is malformed.
    pub async fn load_sessions(&self) -> Result<Vec<Session>, StorageError> {
        Ok(self.load(StorageKey::Sessions).await?.unwrap_or_default())
    }

    /// Insert a session, or replace the stored one with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub async fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut sessions = self.load_sessions().await?;
        match sessions.iter_mut().find(|s| s.id() == session.id()) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        self.save(StorageKey::Sessions, &sessions).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the document is malformed.
    pub async fn load_error_logs(&self) -> Result<Vec<ErrorLog>, StorageError> {
        Ok(self.load(StorageKey::ErrorLogs).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub async fn append_error_log(&self, entry: ErrorLog) -> Result<(), StorageError> {
        let mut logs = self.load_error_logs().await?;
        logs.push(entry);
        self.save(StorageKey::ErrorLogs, &logs).await
    }

    /// Remove every key the engine owns.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on the first key that cannot be removed.
    pub async fn reset_all(&self) -> Result<(), StorageError> {
        for key in StorageKey::ALL {
            self.store.remove(key).await?;
        }
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        match self.store.load(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.store.save(key, value).await
    }
}
