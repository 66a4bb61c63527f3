use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::errors::{NotificationError, StorageError};
use super::order::Order;

/// Top-level record collections held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Menu,
    Orders,
    Cart,
    Categories,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Menu,
        StorageKey::Orders,
        StorageKey::Cart,
        StorageKey::Categories,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Menu => "menu",
            StorageKey::Orders => "orders",
            StorageKey::Cart => "cart",
            StorageKey::Categories => "categories",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown storage key '{s}'"))
    }
}

/// Whether a backend's operations may suspend on I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Completes without suspending (in-process or local database).
    Synchronous,
    /// May suspend on network round trips.
    Asynchronous,
}

/// Key-value JSON store. A missing key reads as `None`, never as an error.
///
/// Implementations are thin pass-throughs: no retries, no caching.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    fn mode(&self) -> StorageMode;
    async fn read(&self, key: StorageKey) -> Result<Option<Value>, StorageError>;
    async fn write(&self, key: StorageKey, value: Value) -> Result<(), StorageError>;
}

/// Reads `key` as `T`, falling back to `T::default()` when the key is absent
/// or holds JSON `null`.
pub async fn load<T>(storage: &dyn Storage, key: StorageKey) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match storage.read(key).await? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

pub async fn save<T>(storage: &dyn Storage, key: StorageKey, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    storage.write(key, value).await
}

/// Receives each order after it has been persisted.
#[async_trait]
pub trait OrderNotifier: Send + Sync + 'static {
    async fn notify(&self, order: &Order) -> Result<(), NotificationError>;
}
