//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, stock availability). Lookups and uniqueness are store concerns
/// and belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The requested quantity exceeds the stock on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn insufficient_stock(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_reports_available_amount() {
        let err = DomainError::insufficient_stock(5, 2);
        assert_eq!(
            err.to_string(),
            "insufficient stock: requested 5, available 2"
        );
    }
}
