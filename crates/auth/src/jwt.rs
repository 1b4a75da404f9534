//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 shared-secret validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks use our own `issued_at`/`expires_at` claims, not `exp`.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| JwtError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
