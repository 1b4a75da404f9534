//! Store and workflow errors.

use thiserror::Error;

use sweetshop_core::DomainError;

/// Failure of the backing store itself (not a business rule).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Query or transaction failed in the database.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be turned back into a valid record.
    #[error("failed to decode stored row: {0}")]
    Decode(String),

    /// The store cannot serve requests (pool closed, lock poisoned).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Error surfaced by catalog workflows and stores.
///
/// Every variant is terminal: nothing is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Stable machine-readable kind, used in logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Validation(_) => "validation_error",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::InsufficientStock { .. } => "insufficient_stock",
            CatalogError::Conflict(_) => "conflict",
            CatalogError::Storage(_) => "storage_error",
        }
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CatalogError::Validation(msg),
            DomainError::InvalidId(msg) => CatalogError::Validation(format!("invalid identifier: {msg}")),
            DomainError::InsufficientStock {
                requested,
                available,
            } => CatalogError::InsufficientStock {
                requested,
                available,
            },
        }
    }
}
