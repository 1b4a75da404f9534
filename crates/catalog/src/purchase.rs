use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use sweetshop_core::{DomainError, DomainResult, Entity, ItemId, PurchaseId, UserId};

use crate::item::{Item, ensure_positive};

/// Immutable record of a completed buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    id: PurchaseId,
    buyer_id: UserId,
    item_id: ItemId,
    quantity: i64,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl Purchase {
    /// Decide a purchase of `quantity` units of `item` for `buyer_id`.
    ///
    /// Checks availability against the item as given and prices the purchase at
    /// the item's current unit price. Does not touch stock; the caller must
    /// decrement it in the same atomic scope that persists the purchase.
    pub fn place(
        id: PurchaseId,
        buyer_id: UserId,
        item: &Item,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        item.ensure_available(quantity)?;
        let total_price = item.price().total_for(quantity)?;
        Ok(Self {
            id,
            buyer_id,
            item_id: *item.id(),
            quantity,
            total_price,
            created_at: occurred_at,
        })
    }

    /// Rebuild a stored purchase, re-checking its invariants.
    pub fn restore(
        id: PurchaseId,
        buyer_id: UserId,
        item_id: ItemId,
        quantity: i64,
        total_price: Decimal,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_positive(quantity, "purchase quantity")?;
        if total_price < Decimal::ZERO {
            return Err(DomainError::validation("total price cannot be negative"));
        }
        Ok(Self {
            id,
            buyer_id,
            item_id,
            quantity,
            total_price,
            created_at,
        })
    }

    pub fn buyer_id(&self) -> UserId {
        self.buyer_id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Purchase {
    type Id = PurchaseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
