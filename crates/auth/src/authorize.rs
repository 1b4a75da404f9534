use std::collections::HashSet;

use thiserror::Error;

use crate::{Permission, PrincipalId, Role, permissions_for_roles};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve permissions from roles using the shop policy.
    pub fn from_roles(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        let permissions = permissions_for_roles(&roles);
        Self {
            principal_id,
            roles,
            permissions,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains(Permission::WILDCARD) || perms.contains(required.as_str()) {
        Ok(())
    } else {
        tracing::debug!(
            principal_id = %principal.principal_id,
            permission = required.as_str(),
            "authorization denied"
        );
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
