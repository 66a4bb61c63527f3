use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::errors::StorageError;
use crate::domain::ports::{Storage, StorageKey, StorageMode};

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StorageError::Unavailable(e.to_string())
        } else {
            StorageError::Backend(e.to_string())
        }
    }
}

/// Store backed by a remote record service (`GET /{key}`, `PUT /{key}`).
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, key: StorageKey) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl Storage for RemoteStore {
    fn mode(&self) -> StorageMode {
        StorageMode::Asynchronous
    }

    async fn read(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let response = self.client.get(self.url(key)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(StorageError::Backend(format!(
                "GET {} returned {}",
                key, status
            ))),
        }
    }

    async fn write(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        let response = self.client.put(self.url(key)).json(&value).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend(format!(
                "PUT {} returned {}: {}",
                key, status, body
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_key() {
        let store = RemoteStore::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.url(StorageKey::Orders), "http://localhost:3001/orders");
        assert_eq!(store.mode(), StorageMode::Asynchronous);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_storage_failure() {
        // Port 9 (discard) is not expected to have an HTTP listener.
        let store = RemoteStore::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = store.read(StorageKey::Menu).await;
        assert!(matches!(
            result,
            Err(StorageError::Unavailable(_)) | Err(StorageError::Backend(_))
        ));
    }
}
