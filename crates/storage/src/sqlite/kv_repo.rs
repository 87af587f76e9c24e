use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{KeyValueStore, StorageError, StorageKey};

fn connection(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(connection)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("value").map_err(connection)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&value)?;
        sqlx::query(
            r"
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(key.as_str())
        .bind(raw)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(connection)?;
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key.as_str())
            .execute(self.pool())
            .await
            .map_err(connection)?;
        Ok(())
    }
}
