use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Response,
};

use sweetshop_auth::{Principal, PrincipalId, Role};
use sweetshop_core::UserId;

use crate::app::errors::json_error;

/// Principal context for a request (authenticated identity + roles).
///
/// Inserted by the auth middleware when a valid bearer token is presented.
/// Extracting it from a request without a valid one is a 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// The token subject, as the buyer identity used by purchases.
    pub fn buyer_id(&self) -> UserId {
        UserId::from_uuid(*self.principal_id.as_uuid())
    }

    pub fn principal(&self) -> Principal {
        Principal::from_roles(self.principal_id, self.roles.clone())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for PrincipalContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PrincipalContext>()
            .cloned()
            .ok_or_else(|| {
                json_error(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "missing or invalid bearer token",
                )
            })
    }
}
