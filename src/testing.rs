use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::StorageError;
use crate::domain::ports::{Storage, StorageKey, StorageMode};
use crate::infrastructure::MemoryStore;

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for FlakyStore {
    fn mode(&self) -> StorageMode {
        StorageMode::Synchronous
    }

    async fn read(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        self.inner.read(key).await
    }

    async fn write(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.write(key, value).await
    }
}
