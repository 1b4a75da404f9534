use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "purchases.create"). The wildcard
/// `"*"` grants everything and is reserved for administrators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: &'static str = "*";

    pub const CATALOG_WRITE: &'static str = "catalog.write";
    pub const INVENTORY_RESTOCK: &'static str = "inventory.restock";
    pub const PURCHASES_CREATE: &'static str = "purchases.create";
    pub const PURCHASES_READ: &'static str = "purchases.read";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == Self::WILDCARD
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role to permission policy.
///
/// `admin` grants the wildcard. Every authenticated principal, including one
/// whose token lists no roles, may buy and see its own purchases.
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(Role::is_admin) {
        return vec![Permission::new(Permission::WILDCARD)];
    }

    vec![
        Permission::new(Permission::PURCHASES_CREATE),
        Permission::new(Permission::PURCHASES_READ),
    ]
}
