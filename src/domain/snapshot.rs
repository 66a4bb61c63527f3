use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::menu::{Category, MenuItem};
use super::order::Order;

/// Whole-dataset backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub menu: Vec<MenuItem>,
    pub orders: Vec<Order>,
    pub cart: Vec<CartLine>,
    pub categories: Vec<Category>,
    pub export_date: DateTime<Utc>,
}

/// An incoming backup. Every collection is optional; absent ones are left
/// untouched in storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotImport {
    pub menu: Option<Vec<MenuItem>>,
    pub orders: Option<Vec<Order>>,
    pub cart: Option<Vec<CartLine>>,
    pub categories: Option<Vec<Category>>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
}

/// Starter catalog bundled with the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub menu: Vec<MenuItem>,
    pub categories: Vec<Category>,
}

const INITIAL_DATA: &str = include_str!("../../data/initial_data.json");

impl SeedData {
    pub fn bundled() -> Result<Self, serde_json::Error> {
        serde_json::from_str(INITIAL_DATA)
    }
}
