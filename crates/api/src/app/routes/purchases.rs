use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use sweetshop_auth::Permission;
use sweetshop_core::{ItemId, PurchaseId};
use sweetshop_infra::PurchaseWithItem;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_purchases).post(create_purchase))
        .route("/:id", get(get_purchase))
}

/// Shared by `POST /purchases` and `POST /sweets/:id/purchase`.
pub(crate) async fn place_purchase(
    services: &AppServices,
    principal: &PrincipalContext,
    item_id: ItemId,
    quantity: i64,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(principal, Permission::PURCHASES_CREATE) {
        return resp;
    }

    let purchase = match services
        .catalog
        .purchase(principal.buyer_id(), item_id, quantity, Utc::now())
        .await
    {
        Ok(p) => p,
        Err(e) => return errors::catalog_error_to_response(e),
    };

    // The purchase is committed; the embedded item is best-effort.
    let item = services.catalog.get_item(item_id).await.ok();

    (
        StatusCode::CREATED,
        Json(dto::purchase_to_json(&PurchaseWithItem { purchase, item })),
    )
        .into_response()
}

pub async fn create_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    payload: Result<Json<dto::CreatePurchaseRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let item_id: ItemId = match body.sweet_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("sweet"),
    };

    place_purchase(&services, &principal, item_id, body.quantity).await
}

pub async fn list_purchases(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::PURCHASES_READ) {
        return resp;
    }

    match services.catalog.list_purchases(principal.buyer_id()).await {
        Ok(views) => Json(serde_json::json!({
            "items": views.iter().map(dto::purchase_to_json).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&principal, Permission::PURCHASES_READ) {
        return resp;
    }
    let id: PurchaseId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("purchase"),
    };

    match services.catalog.get_purchase(principal.buyer_id(), id).await {
        Ok(view) => Json(dto::purchase_to_json(&view)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
