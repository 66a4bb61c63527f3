use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::StorageError;
use crate::domain::ports::{Storage, StorageKey, StorageMode};

/// In-process store. Values live as long as the store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<StorageKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<StorageKey, Value>>, StorageError> {
        self.records
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStore {
    fn mode(&self) -> StorageMode {
        StorageMode::Synchronous
    }

    async fn read(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        Ok(self.records()?.get(&key).cloned())
    }

    async fn write(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        self.records()?.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{load, save};

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        assert!(store.read(StorageKey::Menu).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_defaults_when_missing_or_null() {
        let store = MemoryStore::new();
        let empty: Vec<String> = load(&store, StorageKey::Cart).await.unwrap();
        assert!(empty.is_empty());

        store.write(StorageKey::Cart, Value::Null).await.unwrap();
        let empty: Vec<String> = load(&store, StorageKey::Cart).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_returns_value() {
        let store = MemoryStore::new();
        save(&store, StorageKey::Categories, &vec!["a", "b"])
            .await
            .unwrap();
        assert_eq!(
            store.read(StorageKey::Categories).await.unwrap(),
            Some(json!(["a", "b"]))
        );
        assert_eq!(store.mode(), StorageMode::Synchronous);
    }

    #[tokio::test]
    async fn load_of_wrong_shape_is_a_serialization_error() {
        let store = MemoryStore::new();
        store
            .write(StorageKey::Menu, json!({"not": "a list"}))
            .await
            .unwrap();
        let result: Result<Vec<String>, _> = load(&store, StorageKey::Menu).await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
