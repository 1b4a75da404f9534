//! `sweetshop-auth`: authentication/authorization boundary.
//!
//! Decoupled from HTTP and storage: the API layer extracts a bearer token,
//! this crate turns it into a `Principal` and answers permission checks.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError, Principal};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::{Permission, permissions_for_roles};
pub use principal::PrincipalId;
pub use roles::Role;
