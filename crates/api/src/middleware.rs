use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use sweetshop_auth::JwtValidator;

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the caller from its bearer token.
///
/// Never rejects: a request without a usable token (no header, wrong scheme,
/// bad signature, expired) continues anonymously. Handlers that need an
/// identity extract `PrincipalContext`, which turns anonymous requests into 401s.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(ctx) = resolve_principal(&state, req.headers()) {
        req.extensions_mut().insert(ctx);
    }

    next.run(req).await
}

fn resolve_principal(state: &AuthState, headers: &HeaderMap) -> Option<PrincipalContext> {
    let token = match extract_bearer(headers) {
        Ok(Some(token)) => token,
        Ok(None) => return None,
        Err(reason) => {
            tracing::debug!(reason, "ignoring malformed authorization header");
            return None;
        }
    };

    match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => Some(PrincipalContext::new(claims.sub, claims.roles)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid bearer token");
            None
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| "authorization header is not valid text")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("authorization header must use the Bearer scheme")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(Some(token))
}
