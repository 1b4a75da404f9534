use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in tokens.
///
/// Roles are opaque strings; `permissions_for_roles` maps the known ones to
/// permissions and ignores the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const CUSTOMER: &'static str = "customer";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn customer() -> Self {
        Self::new(Self::CUSTOMER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
