use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_catalog::{Item, ItemFilter, ItemPatch, NewItem, Purchase};
use sweetshop_core::{Entity, ItemId, PurchaseId, UserId};

use super::r#trait::CatalogStore;
use crate::error::{CatalogError, StoreError};

#[derive(Debug, Default)]
struct State {
    items: HashMap<ItemId, Item>,
    purchases: Vec<Purchase>,
}

impl State {
    fn name_taken(&self, name: &str, except: Option<ItemId>) -> bool {
        let name = name.trim();
        self.items
            .values()
            .any(|i| i.name() == name && Some(*i.id()) != except)
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Every mutation runs under a single write lock, so
/// check-then-write sequences (purchase, restock, uniqueness) are atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<State>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, CatalogError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()).into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, CatalogError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()).into())
    }
}

fn duplicate_name(name: &str) -> CatalogError {
    CatalogError::Conflict(format!("a sweet named '{}' already exists", name.trim()))
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        let state = self.read()?;
        Ok(filter.apply(state.items.values().cloned()))
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, CatalogError> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn insert_item(&self, item: Item) -> Result<Item, CatalogError> {
        let mut state = self.write()?;
        if state.name_taken(item.name(), None) {
            return Err(duplicate_name(item.name()));
        }
        if state.items.contains_key(item.id()) {
            return Err(CatalogError::Conflict(format!("sweet {} already exists", item.id())));
        }
        state.items.insert(*item.id(), item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        id: ItemId,
        patch: &ItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError> {
        let mut state = self.write()?;
        let Some(current) = state.items.get(&id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.apply_patch(patch, occurred_at)?;

        if let Some(name) = &patch.name {
            if state.name_taken(name, Some(id)) {
                return Err(duplicate_name(name));
            }
        }

        state.items.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, CatalogError> {
        Ok(self.write()?.items.remove(&id).is_some())
    }

    async fn upsert_items_by_name(
        &self,
        batch: Vec<NewItem>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<Item>, CatalogError> {
        for fields in &batch {
            fields.validate()?;
        }

        let mut state = self.write()?;
        let mut written = Vec::with_capacity(batch.len());
        for fields in batch {
            let existing = state
                .items
                .values()
                .find(|i| i.name() == fields.name.trim())
                .map(|i| *i.id());

            let item = match existing.and_then(|id| state.items.get_mut(&id)) {
                Some(item) => {
                    item.replace_fields(fields, occurred_at)?;
                    item.clone()
                }
                None => {
                    let item = fields.into_item(ItemId::new(), occurred_at)?;
                    state.items.insert(*item.id(), item.clone());
                    item
                }
            };
            written.push(item);
        }
        Ok(written)
    }

    async fn record_purchase(
        &self,
        purchase_id: PurchaseId,
        buyer_id: UserId,
        item_id: ItemId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Purchase, CatalogError> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        let item = state
            .items
            .get_mut(&item_id)
            .ok_or_else(|| CatalogError::not_found(format!("sweet {item_id}")))?;

        let purchase = Purchase::place(purchase_id, buyer_id, item, quantity, occurred_at)?;
        item.take_stock(quantity, occurred_at)?;
        state.purchases.push(purchase.clone());

        Ok(purchase)
    }

    async fn increment_stock(
        &self,
        id: ItemId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError> {
        let mut state = self.write()?;
        let Some(item) = state.items.get_mut(&id) else {
            return Ok(None);
        };
        item.restock(delta, occurred_at)?;
        Ok(Some(item.clone()))
    }

    async fn list_purchases(&self, buyer_id: UserId) -> Result<Vec<Purchase>, CatalogError> {
        let state = self.read()?;
        let mut out: Vec<Purchase> = state
            .purchases
            .iter()
            .filter(|p| p.buyer_id() == buyer_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(a.id()))
        });
        Ok(out)
    }

    async fn get_purchase(
        &self,
        buyer_id: UserId,
        id: PurchaseId,
    ) -> Result<Option<Purchase>, CatalogError> {
        let state = self.read()?;
        Ok(state
            .purchases
            .iter()
            .find(|p| *p.id() == id && p.buyer_id() == buyer_id)
            .cloned())
    }
}
