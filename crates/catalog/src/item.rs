use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, DomainResult, Entity, ItemId};

use crate::{Category, Price};

/// Catalog item (a sweet on sale).
///
/// Fields are private so every `Item` in memory satisfies the catalog
/// invariants: non-empty name, non-negative price, non-negative stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    description: Option<String>,
    category: Category,
    price: Price,
    quantity: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Item {
    /// Rebuild an item from stored fields, re-checking the invariants.
    pub fn restore(
        id: ItemId,
        fields: NewItem,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        fields.validate()?;
        Ok(Self {
            id,
            name: fields.name.trim().to_string(),
            description: fields.description,
            category: fields.category,
            price: fields.price,
            quantity: fields.quantity,
            image_url: fields.image_url,
            created_at,
            updated_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Fail with `InsufficientStock` unless `requested` units are on hand.
    pub fn ensure_available(&self, requested: i64) -> DomainResult<()> {
        ensure_positive(requested, "quantity")?;
        if self.quantity < requested {
            return Err(DomainError::insufficient_stock(requested, self.quantity));
        }
        Ok(())
    }

    /// Remove `quantity` units from stock (purchase path).
    pub fn take_stock(&mut self, quantity: i64, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_available(quantity)?;
        self.quantity -= quantity;
        self.updated_at = occurred_at;
        Ok(())
    }

    /// Add `delta` units to stock (restock path).
    pub fn restock(&mut self, delta: i64, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        ensure_positive(delta, "restock quantity")?;
        self.quantity = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("stock quantity would overflow"))?;
        self.updated_at = occurred_at;
        Ok(())
    }

    /// Apply a validated partial update.
    pub fn apply_patch(&mut self, patch: &ItemPatch, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        patch.validate()?;

        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = Some(image_url.clone());
        }
        self.updated_at = occurred_at;
        Ok(())
    }

    /// Overwrite all editable fields, keeping identity and creation time.
    pub fn replace_fields(&mut self, fields: NewItem, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        fields.validate()?;
        self.name = fields.name.trim().to_string();
        self.description = fields.description;
        self.category = fields.category;
        self.price = fields.price;
        self.quantity = fields.quantity;
        self.image_url = fields.image_url;
        self.updated_at = occurred_at;
        Ok(())
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields required to create an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub price: Price,
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_name(&self.name)?;
        ensure_stock(self.quantity)?;
        Ok(())
    }

    /// Turn validated fields into a brand-new item.
    pub fn into_item(self, id: ItemId, occurred_at: DateTime<Utc>) -> DomainResult<Item> {
        Item::restore(id, self, occurred_at, occurred_at)
    }
}

/// Partial update of an item; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Price>,
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.image_url.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("update must change at least one field"));
        }
        if let Some(name) = &self.name {
            ensure_name(name)?;
        }
        if let Some(quantity) = self.quantity {
            ensure_stock(quantity)?;
        }
        Ok(())
    }
}

fn ensure_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn ensure_stock(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

/// Requested quantities (purchase amounts, restock deltas) must be at least 1.
pub fn ensure_positive(value: i64, what: &str) -> DomainResult<()> {
    if value <= 0 {
        return Err(DomainError::validation(format!("{what} must be a positive integer")));
    }
    Ok(())
}
