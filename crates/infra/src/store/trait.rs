use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_catalog::{Item, ItemFilter, ItemPatch, NewItem, Purchase};
use sweetshop_core::{ItemId, PurchaseId, UserId};

use crate::error::CatalogError;

/// Storage contract for items and purchases.
///
/// Implementations must make `record_purchase` and `increment_stock` atomic:
/// a purchase is persisted if and only if the matching stock decrement is.
/// Item names are unique; writes that would duplicate one fail with
/// `CatalogError::Conflict`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Items matching `filter`, newest first (ties broken by id, descending).
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError>;

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, CatalogError>;

    async fn insert_item(&self, item: Item) -> Result<Item, CatalogError>;

    /// Apply `patch` to an existing item; `None` if the id is unknown.
    async fn update_item(
        &self,
        id: ItemId,
        patch: &ItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError>;

    /// Remove an item; `false` if nothing was deleted.
    async fn delete_item(&self, id: ItemId) -> Result<bool, CatalogError>;

    /// Insert each entry as a new item, or overwrite the item with the same
    /// name (keeping its id and creation time). All or nothing: an invalid
    /// entry or a store failure leaves the catalog untouched.
    async fn upsert_items_by_name(
        &self,
        batch: Vec<NewItem>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<Item>, CatalogError>;

    /// Atomically check stock, decrement it by `quantity` and persist the
    /// purchase priced at the item's current unit price.
    async fn record_purchase(
        &self,
        purchase_id: PurchaseId,
        buyer_id: UserId,
        item_id: ItemId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Purchase, CatalogError>;

    /// Atomically add `delta` to an item's stock; `None` if the id is unknown.
    async fn increment_stock(
        &self,
        id: ItemId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError>;

    /// A buyer's purchases, newest first.
    async fn list_purchases(&self, buyer_id: UserId) -> Result<Vec<Purchase>, CatalogError>;

    async fn get_purchase(
        &self,
        buyer_id: UserId,
        id: PurchaseId,
    ) -> Result<Option<Purchase>, CatalogError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        (**self).list_items(filter).await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, CatalogError> {
        (**self).get_item(id).await
    }

    async fn insert_item(&self, item: Item) -> Result<Item, CatalogError> {
        (**self).insert_item(item).await
    }

    async fn update_item(
        &self,
        id: ItemId,
        patch: &ItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError> {
        (**self).update_item(id, patch, occurred_at).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, CatalogError> {
        (**self).delete_item(id).await
    }

    async fn upsert_items_by_name(
        &self,
        batch: Vec<NewItem>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<Item>, CatalogError> {
        (**self).upsert_items_by_name(batch, occurred_at).await
    }

    async fn record_purchase(
        &self,
        purchase_id: PurchaseId,
        buyer_id: UserId,
        item_id: ItemId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Purchase, CatalogError> {
        (**self)
            .record_purchase(purchase_id, buyer_id, item_id, quantity, occurred_at)
            .await
    }

    async fn increment_stock(
        &self,
        id: ItemId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError> {
        (**self).increment_stock(id, delta, occurred_at).await
    }

    async fn list_purchases(&self, buyer_id: UserId) -> Result<Vec<Purchase>, CatalogError> {
        (**self).list_purchases(buyer_id).await
    }

    async fn get_purchase(
        &self,
        buyer_id: UserId,
        id: PurchaseId,
    ) -> Result<Option<Purchase>, CatalogError> {
        (**self).get_purchase(buyer_id, id).await
    }
}
