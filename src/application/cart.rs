use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::domain::cart::{self, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::menu::MenuItem;
use crate::domain::ports::{self, Storage, StorageKey};

/// The session's draft order.
///
/// Each mutation builds the next line list, persists it, and only then
/// replaces the in-memory lines. A failed write leaves the cart exactly as it
/// was before the call.
pub struct Cart {
    storage: Arc<dyn Storage>,
    lines: Vec<CartLine>,
}

impl Cart {
    /// Loads the persisted cart, or starts empty when none is stored.
    pub async fn restore(storage: Arc<dyn Storage>) -> Result<Self, DomainError> {
        let lines: Vec<CartLine> = ports::load(storage.as_ref(), StorageKey::Cart).await?;
        cart::check_lines(&lines)
            .map_err(|e| DomainError::Validation(format!("stored cart is inconsistent: {e}")))?;
        Ok(Self { storage, lines })
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `item`. An existing line only has its quantity bumped;
    /// its name, price and image stay as first captured.
    pub async fn add(&mut self, item: &MenuItem) -> Result<(), DomainError> {
        if !item.available {
            return Err(DomainError::Validation(format!(
                "menu item '{}' is not available",
                item.name
            )));
        }

        let mut next = self.lines.clone();
        match next.iter_mut().find(|line| line.id == item.id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(1).ok_or_else(|| {
                    DomainError::Validation(format!("quantity overflow for '{}'", item.id))
                })?;
            }
            None => next.push(CartLine::from_menu_item(item)),
        }
        self.commit(next).await
    }

    /// Returns `false` if no line had this id.
    pub async fn remove(&mut self, id: &str) -> Result<bool, DomainError> {
        if !self.lines.iter().any(|line| line.id == id) {
            return Ok(false);
        }
        let next = self
            .lines
            .iter()
            .filter(|line| line.id != id)
            .cloned()
            .collect();
        self.commit(next).await?;
        Ok(true)
    }

    /// Sets the quantity of an existing line; anything below 1 removes it.
    pub async fn set_quantity(&mut self, id: &str, quantity: i64) -> Result<(), DomainError> {
        if quantity < 1 {
            self.remove(id).await?;
            return Ok(());
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| DomainError::Validation(format!("quantity {quantity} is too large")))?;

        let mut next = self.lines.clone();
        let line = next
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("cart line {id}")))?;
        line.quantity = quantity;
        self.commit(next).await
    }

    pub async fn clear(&mut self) -> Result<(), DomainError> {
        self.commit(Vec::new()).await
    }

    pub fn total(&self) -> BigDecimal {
        cart::total(&self.lines)
    }

    pub fn item_count(&self) -> u64 {
        cart::item_count(&self.lines)
    }

    /// Owned copy of the lines, for attaching to a new order.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    async fn commit(&mut self, next: Vec<CartLine>) -> Result<(), DomainError> {
        ports::save(self.storage.as_ref(), StorageKey::Cart, &next).await?;
        self.lines = next;
        Ok(())
    }
}
