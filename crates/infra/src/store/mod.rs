//! Catalog store boundary.
//!
//! One trait, two implementations: an in-memory store for tests/dev and a
//! PostgreSQL store for persistent deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::CatalogStore;
