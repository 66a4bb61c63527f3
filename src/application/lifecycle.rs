use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::domain::cart::{self, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::menu::{Category, MenuItem};
use crate::domain::order::Order;
use crate::domain::ports::{self, Storage, StorageKey};
use crate::domain::snapshot::{SeedData, Snapshot, SnapshotImport};

/// Seeding, reset, and whole-dataset backup/restore.
pub struct DataLifecycle {
    storage: Arc<dyn Storage>,
}

impl DataLifecycle {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Seeds every key that is not yet present. Keys that already hold data
    /// are left alone. Returns the keys that were seeded.
    pub async fn initialize(&self) -> Result<Vec<StorageKey>, DomainError> {
        let seed = seed_data()?;
        let mut seeded = Vec::new();

        for key in StorageKey::ALL {
            if self.storage.read(key).await?.is_some() {
                continue;
            }
            self.storage.write(key, default_value(key, &seed)?).await?;
            log::info!("seeded '{}'", key);
            seeded.push(key);
        }
        Ok(seeded)
    }

    /// Overwrites every key with its default: starter catalog and categories,
    /// empty orders and cart.
    pub async fn reset(&self) -> Result<(), DomainError> {
        let seed = seed_data()?;
        for key in StorageKey::ALL {
            self.storage.write(key, default_value(key, &seed)?).await?;
        }
        log::warn!("all data reset to defaults");
        Ok(())
    }

    pub async fn export_snapshot(&self) -> Result<Snapshot, DomainError> {
        let storage = self.storage.as_ref();
        Ok(Snapshot {
            menu: ports::load(storage, StorageKey::Menu).await?,
            orders: ports::load(storage, StorageKey::Orders).await?,
            cart: ports::load(storage, StorageKey::Cart).await?,
            categories: ports::load(storage, StorageKey::Categories).await?,
            export_date: Utc::now(),
        })
    }

    /// Replaces each collection present in `document`. The whole document is
    /// parsed and checked before the first write, so malformed input changes
    /// nothing. A storage failure part-way may leave earlier keys replaced.
    pub async fn import_snapshot(&self, document: &str) -> Result<Vec<StorageKey>, DomainError> {
        let import: SnapshotImport = serde_json::from_str(document)
            .map_err(|e| DomainError::Import(format!("malformed snapshot: {e}")))?;
        let writes = prepare_import(import)?;

        let mut replaced = Vec::with_capacity(writes.len());
        for (key, value) in writes {
            self.storage.write(key, value).await?;
            replaced.push(key);
        }
        log::info!("snapshot imported ({} collections)", replaced.len());
        Ok(replaced)
    }
}

fn seed_data() -> Result<SeedData, DomainError> {
    SeedData::bundled().map_err(|e| DomainError::Storage(e.into()))
}

fn default_value(key: StorageKey, seed: &SeedData) -> Result<Value, DomainError> {
    let value = match key {
        StorageKey::Menu => serde_json::to_value(&seed.menu),
        StorageKey::Categories => serde_json::to_value(&seed.categories),
        StorageKey::Orders | StorageKey::Cart => Ok(Value::Array(Vec::new())),
    };
    value.map_err(|e| DomainError::Storage(e.into()))
}

fn prepare_import(import: SnapshotImport) -> Result<Vec<(StorageKey, Value)>, DomainError> {
    if let Some(cart) = &import.cart {
        cart::check_lines(cart).map_err(|e| DomainError::Import(format!("invalid cart: {e}")))?;
    }
    for item in import.menu.iter().flatten() {
        item.validate()
            .map_err(|e| DomainError::Import(format!("invalid menu item {}: {e}", item.id)))?;
    }
    for order in import.orders.iter().flatten() {
        order
            .validate()
            .map_err(|e| DomainError::Import(format!("invalid order {}: {e}", order.id)))?;
    }

    let mut writes = Vec::new();
    push_collection::<MenuItem>(&mut writes, StorageKey::Menu, import.menu)?;
    push_collection::<Order>(&mut writes, StorageKey::Orders, import.orders)?;
    push_collection::<CartLine>(&mut writes, StorageKey::Cart, import.cart)?;
    push_collection::<Category>(&mut writes, StorageKey::Categories, import.categories)?;
    Ok(writes)
}

fn push_collection<T: serde::Serialize>(
    writes: &mut Vec<(StorageKey, Value)>,
    key: StorageKey,
    collection: Option<Vec<T>>,
) -> Result<(), DomainError> {
    if let Some(collection) = collection {
        let value = serde_json::to_value(collection)
            .map_err(|e| DomainError::Import(format!("cannot encode '{key}': {e}")))?;
        writes.push((key, value));
    }
    Ok(())
}
