use axum::{routing::get, Router};

pub mod purchases;
pub mod sweets;
pub mod system;

/// Router for every endpoint. Catalog browsing is public; handlers that
/// need a caller extract `PrincipalContext`, which rejects anonymous requests.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/whoami", get(system::whoami))
        .nest("/sweets", sweets::router())
        .nest("/purchases", purchases::router())
}
