use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerInfo, Order, OrderStatus, PaymentInfo};
use crate::domain::ports::{self, Storage, StorageKey};

/// Persisted order history, stored as one `orders` collection.
pub struct OrderRepository {
    storage: Arc<dyn Storage>,
}

impl OrderRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Validates and persists a new pending order. The cart the snapshot came
    /// from is not touched; clearing it is up to the caller.
    pub async fn create(
        &self,
        items: Vec<CartLine>,
        customer: CustomerInfo,
        payment: PaymentInfo,
    ) -> Result<Order, DomainError> {
        let order = Order::place(
            Uuid::now_v7().to_string(),
            items,
            customer,
            payment,
            Utc::now(),
        )?;

        let mut orders = self.load().await?;
        orders.push(order.clone());
        self.persist(&orders).await?;

        log::info!(
            "order {} created for {} ({} items, total {})",
            order.id,
            order.customer_name,
            order.item_count(),
            order.total
        );
        Ok(order)
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Result<Vec<Order>, DomainError> {
        let mut orders = self.load().await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.load().await?.into_iter().find(|order| order.id == id))
    }

    pub async fn filter_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        let mut orders = self.list().await?;
        orders.retain(|order| order.status == status);
        Ok(orders)
    }

    /// Orders whose `created_at` lies within `[start, end]`.
    pub async fn filter_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut orders = self.list().await?;
        orders.retain(|order| order.created_at >= start && order.created_at <= end);
        Ok(orders)
    }

    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, DomainError> {
        let mut orders = self.load().await?;
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("order {id}")))?;

        let previous = order.status;
        order.status = previous.transition_to(status)?;
        order.updated_at = Utc::now();
        let updated = order.clone();

        self.persist(&orders).await?;
        log::info!("order {} moved from {} to {}", id, previous, status);
        Ok(updated)
    }

    /// Returns `false` when no order had this id.
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut orders = self.load().await?;
        let before = orders.len();
        orders.retain(|order| order.id != id);
        if orders.len() == before {
            return Ok(false);
        }

        self.persist(&orders).await?;
        log::info!("order {} deleted", id);
        Ok(true)
    }

    /// Sum of `total` over completed orders.
    pub async fn total_revenue(&self) -> Result<BigDecimal, DomainError> {
        Ok(self
            .load()
            .await?
            .iter()
            .filter(|order| order.status == OrderStatus::Completed)
            .fold(BigDecimal::from(0), |acc, order| acc + &order.total))
    }

    async fn load(&self) -> Result<Vec<Order>, DomainError> {
        Ok(ports::load(self.storage.as_ref(), StorageKey::Orders).await?)
    }

    async fn persist(&self, orders: &[Order]) -> Result<(), DomainError> {
        Ok(ports::save(self.storage.as_ref(), StorageKey::Orders, orders).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::order::PaymentMethod;
    use crate::infrastructure::MemoryStore;
    use crate::testing::FlakyStore;

    fn repo() -> OrderRepository {
        OrderRepository::new(Arc::new(MemoryStore::new()))
    }

    fn snapshot() -> Vec<CartLine> {
        vec![CartLine {
            id: "1".to_string(),
            name: "Nasi Goreng".to_string(),
            price: BigDecimal::from(15000),
            image: String::new(),
            quantity: 2,
        }]
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Budi".to_string(),
            location: "Lantai 2 - Marketing".to_string(),
            notes: Some("tanpa bawang".to_string()),
        }
    }

    async fn place(repo: &OrderRepository) -> Order {
        repo.create(
            snapshot(),
            customer(),
            PaymentInfo::transfer(BigDecimal::from(30000)),
        )
        .await
        .expect("create failed")
    }

    #[tokio::test]
    async fn create_with_cash_records_change() {
        let repo = repo();

        let order = repo
            .create(
                snapshot(),
                customer(),
                PaymentInfo::cash(BigDecimal::from(30000), BigDecimal::from(50000)),
            )
            .await
            .expect("create failed");

        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.change, Some(BigDecimal::from(20000)));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(repo.get_by_id(&order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn create_with_insufficient_cash_persists_nothing() {
        let repo = repo();

        for _ in 0..3 {
            let err = repo
                .create(
                    snapshot(),
                    customer(),
                    PaymentInfo::cash(BigDecimal::from(30000), BigDecimal::from(20000)),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }

        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_empty_snapshot_is_rejected() {
        let err = repo()
            .create(
                Vec::new(),
                customer(),
                PaymentInfo::transfer(BigDecimal::from(0)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let base = Utc::now();
        let stored: Vec<Order> = [("breakfast", 0), ("dinner", 120), ("lunch", 60)]
            .into_iter()
            .map(|(id, minutes)| {
                Order::place(
                    id.to_string(),
                    snapshot(),
                    customer(),
                    PaymentInfo::transfer(BigDecimal::from(30000)),
                    base + Duration::minutes(minutes),
                )
                .unwrap()
            })
            .collect();
        let repo = repo();
        repo.persist(&stored).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["dinner", "lunch", "breakfast"]);
    }

    #[tokio::test]
    async fn status_follows_state_machine() {
        let repo = repo();
        let order = place(&repo).await;

        let processing = repo
            .update_status(&order.id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(processing.status, OrderStatus::Processing);
        assert!(processing.updated_at >= order.updated_at);

        let completed = repo
            .update_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let err = repo
            .update_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Cancelled
            }
        ));
    }

    #[tokio::test]
    async fn cancelled_order_rejects_any_further_transition() {
        let repo = repo();
        let order = place(&repo).await;
        repo.update_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        for next in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let err = repo.update_status(&order.id, next).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidTransition { .. }));
        }

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn update_status_of_unknown_order_is_not_found() {
        let err = repo()
            .update_status("missing", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn filter_by_status_selects_matching_orders() {
        let repo = repo();
        let a = place(&repo).await;
        place(&repo).await;
        repo.update_status(&a.id, OrderStatus::Processing)
            .await
            .unwrap();

        let processing = repo.filter_by_status(OrderStatus::Processing).await.unwrap();
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].id, a.id);
        assert_eq!(
            repo.filter_by_status(OrderStatus::Pending).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn date_range_bounds_are_inclusive() {
        let repo = repo();
        let order = place(&repo).await;
        let at = order.created_at;

        assert_eq!(repo.filter_by_date_range(at, at).await.unwrap().len(), 1);
        assert_eq!(
            repo.filter_by_date_range(at - Duration::hours(1), at + Duration::hours(1))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(repo
            .filter_by_date_range(at + Duration::seconds(1), at + Duration::hours(1))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn revenue_counts_completed_orders_only() {
        let repo = repo();
        let done = place(&repo).await;
        let cancelled = place(&repo).await;
        let processing = place(&repo).await;
        place(&repo).await;

        repo.update_status(&done.id, OrderStatus::Processing).await.unwrap();
        repo.update_status(&done.id, OrderStatus::Completed).await.unwrap();
        repo.update_status(&cancelled.id, OrderStatus::Cancelled).await.unwrap();
        repo.update_status(&processing.id, OrderStatus::Processing).await.unwrap();

        assert_eq!(repo.total_revenue().await.unwrap(), BigDecimal::from(30000));
    }

    #[tokio::test]
    async fn delete_removes_order_permanently() {
        let repo = repo();
        let order = place(&repo).await;

        assert!(repo.delete(&order.id).await.unwrap());
        assert!(!repo.delete(&order.id).await.unwrap());
        assert!(repo.get_by_id(&order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_save_is_reported_and_nothing_is_stored() {
        let store = FlakyStore::shared();
        let repo = OrderRepository::new(store.clone());

        store.fail_writes(true);
        let err = repo
            .create(
                snapshot(),
                customer(),
                PaymentInfo::transfer(BigDecimal::from(30000)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Storage(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }
}
