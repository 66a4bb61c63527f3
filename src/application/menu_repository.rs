use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::menu::{self, Category, MenuItem, MenuItemPatch, NewMenuItem};
use crate::domain::ports::{self, Storage, StorageKey};

/// Catalog of menu items. Every mutation rewrites the whole `menu` collection;
/// concurrent writers are not coordinated and the last write wins.
pub struct MenuRepository {
    storage: Arc<dyn Storage>,
}

impl MenuRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<MenuItem>, DomainError> {
        Ok(ports::load(self.storage.as_ref(), StorageKey::Menu).await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.list().await?.into_iter().find(|item| item.id == id))
    }

    pub async fn create(&self, data: NewMenuItem) -> Result<MenuItem, DomainError> {
        validate(&data.name, &data.price)?;

        let mut items = self.list().await?;
        let item = MenuItem {
            id: Uuid::now_v7().to_string(),
            name: data.name,
            category: data.category,
            price: data.price,
            description: data.description,
            image: data.image,
            available: true,
        };
        items.push(item.clone());
        self.persist(&items).await?;

        log::info!("menu item {} created ({})", item.id, item.name);
        Ok(item)
    }

    pub async fn update(&self, id: &str, patch: MenuItemPatch) -> Result<MenuItem, DomainError> {
        let mut items = self.list().await?;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("menu item {id}")))?;

        let mut updated = item.clone();
        patch.apply_to(&mut updated);
        validate(&updated.name, &updated.price)?;
        *item = updated.clone();

        self.persist(&items).await?;
        Ok(updated)
    }

    /// Returns `false` when no item had this id.
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut items = self.list().await?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }

        self.persist(&items).await?;
        log::info!("menu item {} deleted", id);
        Ok(true)
    }

    /// Case-insensitive match over name, category and description. A blank
    /// or absent term returns the whole catalog.
    pub async fn search(&self, term: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        let items = self.list().await?;
        let term = match term.map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return Ok(items),
        };
        Ok(items.into_iter().filter(|item| item.matches(&term)).collect())
    }

    pub async fn filter_by_category(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<MenuItem>, DomainError> {
        let items = self.list().await?;
        match category {
            Some(category) if !category.is_empty() => Ok(items
                .into_iter()
                .filter(|item| item.category == category)
                .collect()),
            _ => Ok(items),
        }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(ports::load(self.storage.as_ref(), StorageKey::Categories).await?)
    }

    async fn persist(&self, items: &[MenuItem]) -> Result<(), DomainError> {
        Ok(ports::save(self.storage.as_ref(), StorageKey::Menu, items).await?)
    }
}

fn validate(name: &str, price: &BigDecimal) -> Result<(), DomainError> {
    menu::check_fields(name, price).map_err(DomainError::Validation)
}
