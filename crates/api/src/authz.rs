//! API-side authorization guard.
//!
//! Handlers call `require` before touching the catalog, keeping the domain
//! and infra layers auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use sweetshop_auth::{Permission, authorize};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Fail with a 403 response unless the caller holds `permission`.
pub fn require(principal: &PrincipalContext, permission: &'static str) -> Result<(), Response> {
    authorize(&principal.principal(), &Permission::new(permission))
        .map_err(|e| json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}
