//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and catalog service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use sweetshop_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let jwt = Arc::new(sweetshop_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(&config).await?);

    Ok(routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    ))
}
