use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Deserialize;

use sweetshop_catalog::{Category, CategoryFilter, Item, ItemFilter, ItemPatch, NewItem, Price};
use sweetshop_core::{DomainError, Entity};
use sweetshop_infra::PurchaseWithItem;

use crate::app::errors::{self, json_error};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSweetRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl TryFrom<CreateSweetRequest> for NewItem {
    type Error = DomainError;

    fn try_from(req: CreateSweetRequest) -> Result<Self, Self::Error> {
        Ok(NewItem {
            name: req.name,
            description: req.description,
            category: req.category.parse()?,
            price: Price::new(req.price)?,
            quantity: req.quantity,
            image_url: req.image_url,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSweetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl TryFrom<UpdateSweetRequest> for ItemPatch {
    type Error = DomainError;

    fn try_from(req: UpdateSweetRequest) -> Result<Self, Self::Error> {
        Ok(ItemPatch {
            name: req.name,
            description: req.description,
            category: req.category.as_deref().map(str::parse::<Category>).transpose()?,
            price: req.price.map(Price::new).transpose()?,
            quantity: req.quantity,
            image_url: req.image_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub sweet_id: String,
    pub quantity: i64,
}

/// `GET /sweets` query string. Blank values mean "no constraint"; an unknown
/// category yields an empty listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListSweetsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

impl TryFrom<ListSweetsQuery> for ItemFilter {
    type Error = DomainError;

    fn try_from(q: ListSweetsQuery) -> Result<Self, Self::Error> {
        Ok(ItemFilter {
            search: q.search.filter(|s| !s.trim().is_empty()),
            category: q
                .category
                .as_deref()
                .map(CategoryFilter::parse)
                .unwrap_or_default(),
            min_price: parse_price_bound("minPrice", q.min_price.as_deref())?,
            max_price: parse_price_bound("maxPrice", q.max_price.as_deref())?,
        })
    }
}

fn parse_price_bound(name: &str, raw: Option<&str>) -> Result<Option<Decimal>, DomainError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<Decimal>()
        .map(Some)
        .map_err(|_| DomainError::validation(format!("{name} must be a number, got '{raw}'")))
}

/// Unwrap a JSON body, turning extractor failures into our error shape.
pub fn body<T>(payload: Result<axum::Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|axum::Json(v)| v)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

pub fn validation_response(err: DomainError) -> Response {
    errors::catalog_error_to_response(err.into())
}

// -------------------------
// Response mapping
// -------------------------

pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id().to_string(),
        "name": item.name(),
        "description": item.description(),
        "category": item.category().as_str(),
        "price": item.price().amount().to_string(),
        "quantity": item.quantity(),
        "in_stock": item.in_stock(),
        "image_url": item.image_url(),
        "created_at": item.created_at().to_rfc3339(),
        "updated_at": item.updated_at().to_rfc3339(),
    })
}

pub fn purchase_to_json(view: &PurchaseWithItem) -> serde_json::Value {
    let p = &view.purchase;
    serde_json::json!({
        "id": p.id().to_string(),
        "buyer_id": p.buyer_id().to_string(),
        "sweet_id": p.item_id().to_string(),
        "quantity": p.quantity(),
        "total_price": p.total_price().to_string(),
        "created_at": p.created_at().to_rfc3339(),
        "sweet": view.item.as_ref().map(item_to_json),
    })
}
