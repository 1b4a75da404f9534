use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PrincipalId, Role};

/// JWT claims model (transport-agnostic).
///
/// This is the set of claims the shop expects once a token has been decoded
/// and its signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Roles granted to the principal. Empty means a plain customer.
    #[serde(default)]
    pub roles: Vec<Role>,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Validate the claim time window against `now`.
///
/// Signature verification happens in [`crate::jwt`]; this checks claims only.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
