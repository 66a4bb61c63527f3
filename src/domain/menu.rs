use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl MenuItem {
    pub fn validate(&self) -> Result<(), String> {
        check_fields(&self.name, &self.price)
    }

    /// Case-insensitive substring match over name, category and description.
    /// `term` must already be lowercased.
    pub(crate) fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.category.to_lowercase().contains(term)
            || self.description.to_lowercase().contains(term)
    }
}

/// A catalog entry needs a non-blank name and a non-negative price.
pub fn check_fields(name: &str, price: &BigDecimal) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("menu item name is required".to_string());
    }
    if *price < BigDecimal::from(0) {
        return Err(format!("menu item price {price} is negative"));
    }
    Ok(())
}

/// Input for a new catalog entry; the repository assigns `id` and `available`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<BigDecimal>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub available: Option<bool>,
}

impl MenuItemPatch {
    pub(crate) fn apply_to(self, item: &mut MenuItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(image) = self.image {
            item.image = image;
        }
        if let Some(available) = self.available {
            item.available = available;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}
