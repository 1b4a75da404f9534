//! Catalog workflows (application-level orchestration).
//!
//! `CatalogService` is what callers talk to. It validates inputs, delegates
//! the atomic parts (purchase, restock) to a single store operation and
//! assembles read views such as purchase history.
//!
//! ```text
//! purchase(buyer, item, n)
//!   ↓
//! 1. n > 0 or Validation
//!   ↓
//! 2. store.record_purchase: lock item, check stock, decrement, insert purchase
//!   ↓
//! 3. Purchase | NotFound | InsufficientStock | Storage
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use sweetshop_catalog::{Item, ItemFilter, ItemPatch, NewItem, Purchase, ensure_positive, seed};
use sweetshop_core::{Entity, ItemId, PurchaseId, UserId};

use crate::error::CatalogError;
use crate::store::{CatalogStore, InMemoryCatalogStore};

/// A purchase together with the item it refers to (if it still exists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseWithItem {
    pub purchase: Purchase,
    pub item: Option<Item>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Service over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCatalogStore::new()))
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        self.store.list_items(filter).await.inspect_err(log_failure)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn get_item(&self, id: ItemId) -> Result<Item, CatalogError> {
        self.store
            .get_item(id)
            .await
            .and_then(|item| item.ok_or_else(|| sweet_not_found(id)))
            .inspect_err(log_failure)
    }

    #[instrument(skip(self, new_item), fields(name = %new_item.name))]
    pub async fn create_item(
        &self,
        new_item: NewItem,
        occurred_at: DateTime<Utc>,
    ) -> Result<Item, CatalogError> {
        let item = new_item
            .into_item(ItemId::new(), occurred_at)
            .map_err(CatalogError::from)
            .inspect_err(log_failure)?;
        let item = self.store.insert_item(item).await.inspect_err(log_failure)?;
        tracing::info!(item_id = %item.id(), name = item.name(), "sweet created");
        Ok(item)
    }

    #[instrument(skip(self, patch), fields(item_id = %id))]
    pub async fn update_item(
        &self,
        id: ItemId,
        patch: ItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<Item, CatalogError> {
        patch
            .validate()
            .map_err(CatalogError::from)
            .inspect_err(log_failure)?;
        self.store
            .update_item(id, &patch, occurred_at)
            .await
            .and_then(|item| item.ok_or_else(|| sweet_not_found(id)))
            .inspect_err(log_failure)
    }

    /// Deleting an unknown id is not an error; the result says whether a row
    /// was removed.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, id: ItemId) -> Result<bool, CatalogError> {
        let deleted = self.store.delete_item(id).await.inspect_err(log_failure)?;
        tracing::info!(deleted, "sweet delete requested");
        Ok(deleted)
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id, item_id = %item_id))]
    pub async fn purchase(
        &self,
        buyer_id: UserId,
        item_id: ItemId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Purchase, CatalogError> {
        ensure_positive(quantity, "quantity")
            .map_err(CatalogError::from)
            .inspect_err(log_failure)?;

        let purchase = self
            .store
            .record_purchase(PurchaseId::new(), buyer_id, item_id, quantity, occurred_at)
            .await
            .inspect_err(log_failure)?;

        tracing::info!(
            purchase_id = %purchase.id(),
            quantity,
            total_price = %purchase.total_price(),
            "purchase recorded"
        );
        Ok(purchase)
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn restock(
        &self,
        item_id: ItemId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Item, CatalogError> {
        ensure_positive(delta, "restock quantity")
            .map_err(CatalogError::from)
            .inspect_err(log_failure)?;

        let item = self
            .store
            .increment_stock(item_id, delta, occurred_at)
            .await
            .and_then(|item| item.ok_or_else(|| sweet_not_found(item_id)))
            .inspect_err(log_failure)?;

        tracing::info!(delta, quantity = item.quantity(), "sweet restocked");
        Ok(item)
    }

    /// Upsert the default catalog by name in one batch; returns the number of
    /// rows written.
    #[instrument(skip(self))]
    pub async fn seed(&self, occurred_at: DateTime<Utc>) -> Result<usize, CatalogError> {
        let catalog = seed::default_catalog()
            .map_err(CatalogError::from)
            .inspect_err(log_failure)?;
        let written = self
            .store
            .upsert_items_by_name(catalog, occurred_at)
            .await
            .inspect_err(log_failure)?
            .len();
        tracing::info!(written, "default catalog seeded");
        Ok(written)
    }

    /// The buyer's purchases, newest first, each with its current item.
    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn list_purchases(&self, buyer_id: UserId) -> Result<Vec<PurchaseWithItem>, CatalogError> {
        let purchases = self
            .store
            .list_purchases(buyer_id)
            .await
            .inspect_err(log_failure)?;

        let mut out = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            let item = self
                .store
                .get_item(purchase.item_id())
                .await
                .inspect_err(log_failure)?;
            out.push(PurchaseWithItem { purchase, item });
        }
        Ok(out)
    }

    /// One of the buyer's purchases. Another buyer's purchase is `NotFound`.
    #[instrument(skip(self), fields(buyer_id = %buyer_id, purchase_id = %id))]
    pub async fn get_purchase(
        &self,
        buyer_id: UserId,
        id: PurchaseId,
    ) -> Result<PurchaseWithItem, CatalogError> {
        let purchase = self
            .store
            .get_purchase(buyer_id, id)
            .await
            .and_then(|p| p.ok_or_else(|| CatalogError::not_found(format!("purchase {id}"))))
            .inspect_err(log_failure)?;
        let item = self
            .store
            .get_item(purchase.item_id())
            .await
            .inspect_err(log_failure)?;
        Ok(PurchaseWithItem { purchase, item })
    }
}

fn sweet_not_found(id: ItemId) -> CatalogError {
    CatalogError::not_found(format!("sweet {id}"))
}

fn log_failure(err: &CatalogError) {
    match err {
        CatalogError::Storage(e) => tracing::error!(error = %e, "catalog store failure"),
        other => tracing::warn!(kind = other.kind(), error = %other, "catalog request rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sweetshop_catalog::{Category, Price};

    fn sweet(name: &str, price: i64, quantity: i64) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: None,
            category: Category::Sweets,
            price: Price::new(Decimal::from(price)).unwrap(),
            quantity,
            image_url: None,
        }
    }

    async fn service_with(name: &str, price: i64, quantity: i64) -> (CatalogService, Item) {
        let service = CatalogService::in_memory();
        let item = service
            .create_item(sweet(name, price, quantity), Utc::now())
            .await
            .unwrap();
        (service, item)
    }

    #[tokio::test]
    async fn purchase_decrements_stock_and_prices_the_total() {
        let (service, item) = service_with("Ajmeera Kalakandh", 450, 10).await;
        let buyer = UserId::new();

        let purchase = service.purchase(buyer, *item.id(), 3, Utc::now()).await.unwrap();

        assert_eq!(purchase.total_price(), Decimal::from(1350));
        assert_eq!(purchase.quantity(), 3);
        assert_eq!(service.get_item(*item.id()).await.unwrap().quantity(), 7);

        let history = service.list_purchases(buyer).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].purchase, purchase);
    }

    #[tokio::test]
    async fn purchase_beyond_stock_fails_and_leaves_quantity() {
        let (service, item) = service_with("Badusha", 280, 2).await;

        let err = service
            .purchase(UserId::new(), *item.id(), 5, Utc::now())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CatalogError::InsufficientStock {
                requested: 5,
                available: 2
            }
        );
        assert_eq!(service.get_item(*item.id()).await.unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn purchase_of_unknown_item_is_not_found() {
        let service = CatalogService::in_memory();
        let err = service
            .purchase(UserId::new(), ItemId::new(), 1, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_positive_purchase_quantity_is_rejected() {
        let (service, item) = service_with("Jalebi", 250, 5).await;
        for quantity in [0, -2] {
            let err = service
                .purchase(UserId::new(), *item.id(), quantity, Utc::now())
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)));
        }
        assert_eq!(service.get_item(*item.id()).await.unwrap().quantity(), 5);
    }

    #[tokio::test]
    async fn restock_adds_exactly_delta() {
        let (service, item) = service_with("Kalakand", 380, 5).await;
        let restocked = service.restock(*item.id(), 10, Utc::now()).await.unwrap();
        assert_eq!(restocked.quantity(), 15);
    }

    #[tokio::test]
    async fn restock_rejects_non_positive_delta() {
        let (service, item) = service_with("Kalakand", 380, 5).await;
        for delta in [0, -1] {
            let err = service.restock(*item.id(), delta, Utc::now()).await.unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)));
        }
        assert_eq!(service.get_item(*item.id()).await.unwrap().quantity(), 5);
    }

    #[tokio::test]
    async fn restock_of_unknown_item_is_not_found() {
        let service = CatalogService::in_memory();
        let err = service.restock(ItemId::new(), 3, Utc::now()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_purchases_never_oversell() {
        let (service, item) = service_with("Gond Ke Ladoo", 480, 1).await;
        let id = *item.id();

        let a = tokio::spawn({
            let service = service.clone();
            async move { service.purchase(UserId::new(), id, 1, Utc::now()).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.purchase(UserId::new(), id, 1, Utc::now()).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| matches!(r, Err(CatalogError::InsufficientStock { available: 0, .. })))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(short, 1);
        assert_eq!(service.get_item(id).await.unwrap().quantity(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_concurrent_buyers_sell_exactly_the_stock() {
        let (service, item) = service_with("Jalebi", 250, 25).await;
        let id = *item.id();

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.purchase(UserId::new(), id, 1, Utc::now()).await })
            })
            .collect();

        let mut sold = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                sold += 1;
            }
        }

        assert_eq!(sold, 25);
        assert_eq!(service.get_item(id).await.unwrap().quantity(), 0);
    }

    #[tokio::test]
    async fn listing_is_repeatable_and_filtered() {
        let service = CatalogService::in_memory();
        let t0 = Utc::now();
        service.create_item(sweet("Coconut Ladoo", 280, 18), t0).await.unwrap();
        service
            .create_item(sweet("Basen Ladoo", 350, 10), t0 + chrono::Duration::seconds(1))
            .await
            .unwrap();
        service
            .create_item(sweet("Jalebi", 250, 25), t0 + chrono::Duration::seconds(2))
            .await
            .unwrap();

        let filter = ItemFilter::new().with_search("ladoo").with_max_price(Decimal::from(300));
        let first = service.list_items(&filter).await.unwrap();
        let second = service.list_items(&filter).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name(), "Coconut Ladoo");

        let all = service.list_items(&ItemFilter::new()).await.unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Jalebi", "Basen Ladoo", "Coconut Ladoo"]);
    }

    #[tokio::test]
    async fn update_unknown_item_is_not_found_and_empty_patch_is_invalid() {
        let (service, item) = service_with("Til Patti", 200, 20).await;

        let patch = ItemPatch {
            quantity: Some(3),
            ..ItemPatch::default()
        };
        let err = service
            .update_item(ItemId::new(), patch, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let err = service
            .update_item(*item.id(), ItemPatch::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_history_survives() {
        let (service, item) = service_with("Rasmalai", 450, 12).await;
        let buyer = UserId::new();
        let purchase = service.purchase(buyer, *item.id(), 2, Utc::now()).await.unwrap();

        assert!(service.delete_item(*item.id()).await.unwrap());
        assert!(!service.delete_item(*item.id()).await.unwrap());

        let view = service.get_purchase(buyer, *purchase.id()).await.unwrap();
        assert_eq!(view.purchase, purchase);
        assert!(view.item.is_none());
    }

    #[tokio::test]
    async fn other_buyers_purchase_is_not_found() {
        let (service, item) = service_with("Rasmalai", 450, 12).await;
        let purchase = service
            .purchase(UserId::new(), *item.id(), 1, Utc::now())
            .await
            .unwrap();

        let err = service
            .get_purchase(UserId::new(), *purchase.id())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let service = CatalogService::in_memory();
        assert_eq!(service.seed(Utc::now()).await.unwrap(), 21);
        let first = service.list_items(&ItemFilter::new()).await.unwrap();

        assert_eq!(service.seed(Utc::now()).await.unwrap(), 21);
        let second = service.list_items(&ItemFilter::new()).await.unwrap();

        assert_eq!(first.len(), 21);
        assert_eq!(second.len(), 21);
        let ids = |items: &[Item]| {
            let mut ids: Vec<_> = items.iter().map(|i| *i.id()).collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&first), ids(&second));
    }
}
