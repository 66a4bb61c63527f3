use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use serde_json::Value;

use crate::db::DbPool;
use crate::domain::errors::StorageError;
use crate::domain::ports::{Storage, StorageKey, StorageMode};
use crate::schema::records;

use super::models::{NewRecordRow, RecordRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for StorageError {
    fn from(e: diesel::result::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for StorageError {
    fn from(e: r2d2::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Local durable store: one SQLite row per key, value kept as JSON text.
///
/// Diesel calls block the current thread; the store reports itself as
/// synchronous because every call completes without yielding. Async hosts
/// move these calls off their workers (see the record handlers).
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for SqliteStore {
    fn mode(&self) -> StorageMode {
        StorageMode::Synchronous
    }

    async fn read(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let mut conn = self.pool.get()?;

        let row = records::table
            .filter(records::key.eq(key.as_str()))
            .select(RecordRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        log::debug!("read '{}' (updated {})", row.key, row.updated_at);
        Ok(Some(serde_json::from_str(&row.value)?))
    }

    async fn write(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;

        diesel::replace_into(records::table)
            .values(&NewRecordRow {
                key: key.as_str(),
                value: serde_json::to_string(&value)?,
                updated_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::SqliteStore;
    use crate::db::create_pool;
    use crate::domain::ports::{Storage, StorageKey, StorageMode};
    use crate::run_migrations;

    fn memory_store() -> SqliteStore {
        let pool = create_pool(":memory:").expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn read_returns_none_for_unknown_key() {
        let store = memory_store();

        let result = store
            .read(StorageKey::Orders)
            .await
            .expect("read should not error");

        assert!(result.is_none());
        assert_eq!(store.mode(), StorageMode::Synchronous);
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let store = memory_store();
        let value = json!([{"id": "1", "name": "Es Teh", "price": "5000"}]);

        store
            .write(StorageKey::Menu, value.clone())
            .await
            .expect("write failed");

        let read = store.read(StorageKey::Menu).await.expect("read failed");
        assert_eq!(read, Some(value));
    }

    #[tokio::test]
    async fn write_replaces_previous_value() {
        let store = memory_store();

        store.write(StorageKey::Cart, json!([1])).await.unwrap();
        store.write(StorageKey::Cart, json!([])).await.unwrap();

        assert_eq!(store.read(StorageKey::Cart).await.unwrap(), Some(json!([])));
    }

    #[tokio::test]
    async fn data_survives_reopening_the_database_file() {
        let path = std::env::temp_dir().join(format!("canteen-{}.db", uuid::Uuid::now_v7()));
        let url = path.to_string_lossy().to_string();

        {
            let pool = create_pool(&url).expect("Failed to create pool");
            run_migrations(&pool).expect("Failed to run migrations");
            SqliteStore::new(pool)
                .write(StorageKey::Categories, json!([{"id": 1, "name": "snack"}]))
                .await
                .expect("write failed");
        }

        let pool = create_pool(&url).expect("Failed to reopen pool");
        run_migrations(&pool).expect("Migrations should be idempotent");
        let read = SqliteStore::new(pool)
            .read(StorageKey::Categories)
            .await
            .expect("read failed");
        assert_eq!(read, Some(json!([{"id": 1, "name": "snack"}])));

        let _ = std::fs::remove_file(&path);
    }
}
