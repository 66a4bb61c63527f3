use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerInfo, Order, PaymentInfo, PaymentMethod};
use crate::domain::ports::OrderNotifier;

use super::cart::Cart;
use super::order_repository::OrderRepository;

/// Turns the live cart into a persisted order, then notifies and clears.
///
/// Order creation and cart clearing are two separate writes. Once the order
/// is stored, neither a notifier failure nor a cart-clear failure undoes it.
pub struct CheckoutService {
    orders: OrderRepository,
    notifier: Arc<dyn OrderNotifier>,
}

impl CheckoutService {
    pub fn new(orders: OrderRepository, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self { orders, notifier }
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    pub async fn checkout(
        &self,
        cart: &mut Cart,
        customer: CustomerInfo,
        method: PaymentMethod,
        cash_amount: Option<BigDecimal>,
    ) -> Result<Order, DomainError> {
        let payment = PaymentInfo {
            total: cart.total(),
            method,
            cash_amount,
            change: None,
        };
        let order = self.orders.create(cart.snapshot(), customer, payment).await?;

        if let Err(e) = self.notifier.notify(&order).await {
            log::warn!("order {} saved but notification failed: {}", order.id, e);
        }
        if let Err(e) = cart.clear().await {
            log::warn!("order {} saved but cart could not be cleared: {}", order.id, e);
        }
        Ok(order)
    }
}
