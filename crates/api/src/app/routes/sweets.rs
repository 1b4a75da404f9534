use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use sweetshop_auth::Permission;
use sweetshop_catalog::{ItemFilter, ItemPatch, NewItem};
use sweetshop_core::ItemId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sweets).post(create_sweet))
        .route("/seed", post(seed_sweets))
        .route("/:id", get(get_sweet).put(update_sweet).delete(delete_sweet))
        .route("/:id/restock", post(restock_sweet))
        .route("/:id/purchase", post(purchase_sweet))
}

fn parse_id(id: &str) -> Result<ItemId, axum::response::Response> {
    id.parse().map_err(|_| errors::invalid_id("sweet"))
}

pub async fn list_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListSweetsQuery>,
) -> axum::response::Response {
    let filter = match ItemFilter::try_from(query) {
        Ok(f) => f,
        Err(e) => return dto::validation_response(e),
    };

    match services.catalog.list_items(&filter).await {
        Ok(items) => Json(serde_json::json!({
            "items": items.iter().map(dto::item_to_json).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get_item(id).await {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    payload: Result<Json<dto::CreateSweetRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::CATALOG_WRITE) {
        return resp;
    }
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let fields = match NewItem::try_from(body) {
        Ok(f) => f,
        Err(e) => return dto::validation_response(e),
    };

    match services.catalog.create_item(fields, Utc::now()).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateSweetRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::CATALOG_WRITE) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let patch = match ItemPatch::try_from(body) {
        Ok(p) => p,
        Err(e) => return dto::validation_response(e),
    };

    match services.catalog.update_item(id, patch, Utc::now()).await {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::CATALOG_WRITE) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.delete_item(id).await {
        Ok(deleted) => Json(serde_json::json!({
            "id": id.to_string(),
            "deleted": deleted,
        }))
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn restock_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    payload: Result<Json<dto::QuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::INVENTORY_RESTOCK) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.catalog.restock(id, body.quantity, Utc::now()).await {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn purchase_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    payload: Result<Json<dto::QuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    super::purchases::place_purchase(&services, &principal, id, body.quantity).await
}

pub async fn seed_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::CATALOG_WRITE) {
        return resp;
    }

    match services.catalog.seed(Utc::now()).await {
        Ok(seeded) => Json(serde_json::json!({ "seeded": seeded })).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
