use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{self, CartLine};
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// pending → processing → completed, pending|processing → cancelled.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub name: String,
    pub location: String,
    pub notes: Option<String>,
}

/// Payment details supplied at checkout. `total` is the amount the caller
/// believes is due; it is checked against the cart snapshot.
#[derive(Debug, Clone)]
pub struct PaymentInfo {
    pub total: BigDecimal,
    pub method: PaymentMethod,
    pub cash_amount: Option<BigDecimal>,
    pub change: Option<BigDecimal>,
}

impl PaymentInfo {
    pub fn cash(total: BigDecimal, cash_amount: BigDecimal) -> Self {
        Self {
            total,
            method: PaymentMethod::Cash,
            cash_amount: Some(cash_amount),
            change: None,
        }
    }

    pub fn transfer(total: BigDecimal) -> Self {
        Self {
            total,
            method: PaymentMethod::Transfer,
            cash_amount: None,
            change: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_location: String,
    pub items: Vec<CartLine>,
    pub total: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_amount: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<BigDecimal>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Validates the checkout input and builds a pending order. Nothing is
    /// corrected or clamped: any inconsistency is a validation error. A cash
    /// payment without `change` gets it derived from the cash amount.
    pub fn place(
        id: String,
        items: Vec<CartLine>,
        customer: CustomerInfo,
        payment: PaymentInfo,
        now: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let change = match (payment.method, &payment.cash_amount, payment.change) {
            (PaymentMethod::Cash, Some(cash), None) => Some(cash - &payment.total),
            (_, _, given) => given,
        };

        let order = Order {
            id,
            customer_name: customer.name,
            customer_location: customer.location,
            items,
            total: payment.total,
            notes: customer.notes.filter(|n| !n.trim().is_empty()),
            payment_method: payment.method,
            cash_amount: payment.cash_amount,
            change,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        order.validate().map_err(DomainError::Validation)?;
        Ok(order)
    }

    /// Checks the invariants every stored order holds: at least one valid
    /// line, a named customer and location, a total equal to the line sum,
    /// and payment fields consistent with the method.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("order has no items".to_string());
        }
        cart::check_lines(&self.items)?;
        if self.customer_name.trim().is_empty() {
            return Err("customer name is required".to_string());
        }
        if self.customer_location.trim().is_empty() {
            return Err("customer location is required".to_string());
        }

        let expected = cart::total(&self.items);
        if self.total != expected {
            return Err(format!(
                "order total {} does not match item total {}",
                self.total, expected
            ));
        }

        match self.payment_method {
            PaymentMethod::Cash => {
                let Some(cash) = &self.cash_amount else {
                    return Err("cash payment requires a cash amount".to_string());
                };
                if *cash < self.total {
                    return Err(format!(
                        "cash amount {} is less than total {}",
                        cash, self.total
                    ));
                }
                let change = cash - &self.total;
                if self.change.as_ref() != Some(&change) {
                    return Err(format!(
                        "change does not equal cash amount minus total ({change})"
                    ));
                }
            }
            PaymentMethod::Transfer => {
                if self.cash_amount.is_some() || self.change.is_some() {
                    return Err(
                        "transfer payment must not carry a cash amount or change".to_string(),
                    );
                }
            }
        }
        Ok(())
    }

    pub fn item_count(&self) -> u64 {
        cart::item_count(&self.items)
    }
}
