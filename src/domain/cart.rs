use std::collections::HashSet;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::menu::MenuItem;

/// One distinct menu item in the draft order. Name, price and image are copied
/// from the menu at the time the line was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub price: BigDecimal,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn from_menu_item(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price.clone(),
            image: item.image.clone(),
            quantity: 1,
        }
    }

    pub fn extended_price(&self) -> BigDecimal {
        &self.price * &BigDecimal::from(self.quantity)
    }
}

/// Σ(price × quantity) over `lines`.
pub fn total(lines: &[CartLine]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |acc, line| acc + line.extended_price())
}

/// Σ(quantity) over `lines`.
pub fn item_count(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

/// Checks the line-set invariants: unique ids and positive quantities.
pub fn check_lines(lines: &[CartLine]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(format!("line '{}' has a zero quantity", line.id));
        }
        if !seen.insert(line.id.as_str()) {
            return Err(format!("duplicate line for item '{}'", line.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn line(id: &str, price: &str, quantity: u32) -> CartLine {
        CartLine {
            id: id.to_string(),
            name: format!("item {id}"),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            image: String::new(),
            quantity,
        }
    }

    #[test]
    fn total_of_empty_cart_is_zero() {
        assert_eq!(total(&[]), BigDecimal::from(0));
        assert_eq!(item_count(&[]), 0);
    }

    #[test]
    fn total_sums_extended_prices() {
        let lines = vec![line("1", "15000", 2), line("2", "2500.50", 3)];
        assert_eq!(total(&lines), BigDecimal::from_str("37501.50").unwrap());
        assert_eq!(item_count(&lines), 5);
    }

    #[test]
    fn check_lines_rejects_duplicates() {
        let lines = vec![line("1", "1", 1), line("1", "1", 2)];
        assert!(check_lines(&lines).is_err());
    }

    #[test]
    fn check_lines_rejects_zero_quantity() {
        assert!(check_lines(&[line("1", "1", 0)]).is_err());
        assert!(check_lines(&[line("1", "1", 1), line("2", "1", 4)]).is_ok());
    }
}
