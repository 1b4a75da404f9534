//! PostgreSQL-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | CatalogError |
//! |------------|-----------------|--------------|
//! | Database (unique violation) | `23505` | `Conflict` (duplicate item name) |
//! | Database (check violation) | `23514` | `Validation` |
//! | Database (numeric out of range) | `22003` | `Validation` (stock overflow) |
//! | Database (other) | any | `Storage(Backend)` |
//! | PoolClosed / PoolTimedOut | n/a | `Storage(Unavailable)` |
//! | Other | n/a | `Storage(Backend)` |
//!
//! Rows that fail to decode into a valid `Item`/`Purchase` are
//! `Storage(Decode)`; they are never skipped.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use sweetshop_catalog::{Category, Item, ItemFilter, ItemPatch, NewItem, Price, Purchase, ensure_positive};
use sweetshop_core::{DomainError, Entity, ItemId, PurchaseId, UserId};

use super::r#trait::CatalogStore;
use crate::error::{CatalogError, StoreError};

const SWEET_COLUMNS: &str =
    "id, name, description, category, price, quantity, image_url, created_at, updated_at";

const PURCHASE_COLUMNS: &str = "id, buyer_id, item_id, quantity, total_price, created_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sweets (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL UNIQUE CHECK (length(btrim(name)) > 0),
        description TEXT,
        category    TEXT NOT NULL
                    CHECK (category IN ('sweets', 'snacks', 'premium_sweets', 'gift_boxes', 'seasonal')),
        price       NUMERIC NOT NULL CHECK (price >= 0),
        quantity    BIGINT NOT NULL CHECK (quantity >= 0),
        image_url   TEXT,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS sweets_newest_first_idx
        ON sweets (created_at DESC, id DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchases (
        id          UUID PRIMARY KEY,
        buyer_id    UUID NOT NULL,
        item_id     UUID NOT NULL,
        quantity    BIGINT NOT NULL CHECK (quantity > 0),
        total_price NUMERIC NOT NULL CHECK (total_price >= 0),
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS purchases_buyer_idx
        ON purchases (buyer_id, created_at DESC)
    "#,
];

/// Catalog store on a PostgreSQL connection pool.
///
/// `purchases.item_id` carries no foreign key: deleting an item never fails
/// because of its purchase history.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to connect to postgres: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), CatalogError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn lock_item(
        tx: &mut Transaction<'_, Postgres>,
        id: ItemId,
    ) -> Result<Option<Item>, CatalogError> {
        let row = sqlx::query(&format!(
            "SELECT {SWEET_COLUMNS} FROM sweets WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_item", e))?;

        row.map(|r| decode_item(&r)).transpose()
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self))]
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SWEET_COLUMNS}
            FROM sweets
            WHERE ($1::text IS NULL OR name ILIKE $1)
                AND ($2::text IS NULL OR category = $2)
                AND ($3::numeric IS NULL OR price >= $3)
                AND ($4::numeric IS NULL OR price <= $4)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.search_pattern())
        .bind(filter.category.as_column_value())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        rows.iter().map(decode_item).collect()
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, CatalogError> {
        let row = sqlx::query(&format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?;

        row.map(|r| decode_item(&r)).transpose()
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()))]
    async fn insert_item(&self, item: Item) -> Result<Item, CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO sweets (id, name, description, category, price, quantity, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id().as_uuid())
        .bind(item.name())
        .bind(item.description())
        .bind(item.category().as_str())
        .bind(item.price().amount())
        .bind(item.quantity())
        .bind(item.image_url())
        .bind(item.created_at())
        .bind(item.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;

        Ok(item)
    }

    #[instrument(skip(self, patch), fields(item_id = %id))]
    async fn update_item(
        &self,
        id: ItemId,
        patch: &ItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(mut item) = Self::lock_item(&mut tx, id).await? else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        };

        if let Err(e) = item.apply_patch(patch, occurred_at) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(e.into());
        }

        sqlx::query(
            r#"
            UPDATE sweets
            SET name = $2, description = $3, category = $4, price = $5,
                quantity = $6, image_url = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(item.name())
        .bind(item.description())
        .bind(item.category().as_str())
        .bind(item.price().amount())
        .bind(item.quantity())
        .bind(item.image_url())
        .bind(item.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(Some(item))
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete_item(&self, id: ItemId) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM sweets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// One upsert statement per entry, all inside a single transaction.
    #[instrument(skip(self, batch), fields(count = batch.len()))]
    async fn upsert_items_by_name(
        &self,
        batch: Vec<NewItem>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<Item>, CatalogError> {
        for fields in &batch {
            fields.validate()?;
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut written = Vec::with_capacity(batch.len());
        for fields in &batch {
            let row = sqlx::query(&format!(
                r#"
                INSERT INTO sweets (id, name, description, category, price, quantity, image_url, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                ON CONFLICT (name) DO UPDATE
                SET description = EXCLUDED.description,
                    category = EXCLUDED.category,
                    price = EXCLUDED.price,
                    quantity = EXCLUDED.quantity,
                    image_url = EXCLUDED.image_url,
                    updated_at = EXCLUDED.updated_at
                RETURNING {SWEET_COLUMNS}
                "#
            ))
            .bind(ItemId::new().as_uuid())
            .bind(fields.name.trim())
            .bind(fields.description.as_deref())
            .bind(fields.category.as_str())
            .bind(fields.price.amount())
            .bind(fields.quantity)
            .bind(fields.image_url.as_deref())
            .bind(occurred_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("upsert_items_by_name", e))?;

            written.push(decode_item(&row)?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(written)
    }

    /// Locks the item row, checks stock, decrements it with a guarded update
    /// and inserts the purchase, all in one transaction.
    #[instrument(
        skip(self),
        fields(purchase_id = %purchase_id, buyer_id = %buyer_id, item_id = %item_id)
    )]
    async fn record_purchase(
        &self,
        purchase_id: PurchaseId,
        buyer_id: UserId,
        item_id: ItemId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Purchase, CatalogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(item) = Self::lock_item(&mut tx, item_id).await? else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(CatalogError::not_found(format!("sweet {item_id}")));
        };

        let purchase = match Purchase::place(purchase_id, buyer_id, &item, quantity, occurred_at) {
            Ok(p) => p,
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(e.into());
            }
        };

        let decremented = sqlx::query(
            r#"
            UPDATE sweets
            SET quantity = quantity - $2, updated_at = $3
            WHERE id = $1 AND quantity >= $2
            "#,
        )
        .bind(item_id.as_uuid())
        .bind(quantity)
        .bind(occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        if decremented.rows_affected() != 1 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(CatalogError::InsufficientStock {
                requested: quantity,
                available: item.quantity(),
            });
        }

        sqlx::query(&format!(
            "INSERT INTO purchases ({PURCHASE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(purchase.id().as_uuid())
        .bind(purchase.buyer_id().as_uuid())
        .bind(purchase.item_id().as_uuid())
        .bind(purchase.quantity())
        .bind(purchase.total_price())
        .bind(purchase.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_purchase", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(purchase)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn increment_stock(
        &self,
        id: ItemId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<Item>, CatalogError> {
        ensure_positive(delta, "restock quantity")?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE sweets
            SET quantity = quantity + $2, updated_at = $3
            WHERE id = $1
            RETURNING {SWEET_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(delta)
        .bind(occurred_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment_stock", e))?;

        row.map(|r| decode_item(&r)).transpose()
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    async fn list_purchases(&self, buyer_id: UserId) -> Result<Vec<Purchase>, CatalogError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE buyer_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(buyer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_purchases", e))?;

        rows.iter().map(decode_purchase).collect()
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id, purchase_id = %id))]
    async fn get_purchase(
        &self,
        buyer_id: UserId,
        id: PurchaseId,
    ) -> Result<Option<Purchase>, CatalogError> {
        let row = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1 AND buyer_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(buyer_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_purchase", e))?;

        row.map(|r| decode_purchase(&r)).transpose()
    }
}

/// Map SQLx errors into catalog errors, tagging the failing operation.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> CatalogError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                // Unique violation: the only unique business key is the item name.
                Some("23505") => CatalogError::Conflict("a sweet with this name already exists".to_string()),
                Some("23514") => CatalogError::Validation(msg),
                Some("22003") => CatalogError::Validation("stock quantity would overflow".to_string()),
                _ => StoreError::Backend(msg).into(),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation)).into()
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {}", operation)).into()
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)).into(),
    }
}

fn decode_error(err: impl core::fmt::Display) -> CatalogError {
    StoreError::Decode(err.to_string()).into()
}

// SQLx row types

#[derive(Debug)]
struct SweetRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    category: String,
    price: Decimal,
    quantity: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SweetRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SweetRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<SweetRow> for Item {
    type Error = DomainError;

    fn try_from(row: SweetRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse()?;
        let fields = NewItem {
            name: row.name,
            description: row.description,
            category,
            price: Price::new(row.price)?,
            quantity: row.quantity,
            image_url: row.image_url,
        };
        Item::restore(ItemId::from_uuid(row.id), fields, row.created_at, row.updated_at)
    }
}

#[derive(Debug)]
struct PurchaseRow {
    id: Uuid,
    buyer_id: Uuid,
    item_id: Uuid,
    quantity: i64,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for PurchaseRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PurchaseRow {
            id: row.try_get("id")?,
            buyer_id: row.try_get("buyer_id")?,
            item_id: row.try_get("item_id")?,
            quantity: row.try_get("quantity")?,
            total_price: row.try_get("total_price")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Purchase::restore(
            PurchaseId::from_uuid(row.id),
            UserId::from_uuid(row.buyer_id),
            ItemId::from_uuid(row.item_id),
            row.quantity,
            row.total_price,
            row.created_at,
        )
    }
}

fn decode_item(row: &PgRow) -> Result<Item, CatalogError> {
    let raw = SweetRow::from_row(row).map_err(decode_error)?;
    Item::try_from(raw).map_err(decode_error)
}

fn decode_purchase(row: &PgRow) -> Result<Purchase, CatalogError> {
    let raw = PurchaseRow::from_row(row).map_err(decode_error)?;
    Purchase::try_from(raw).map_err(decode_error)
}
