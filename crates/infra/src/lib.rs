//! Infrastructure layer: catalog stores, workflows and configuration.

pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use error::{CatalogError, StoreError};
pub use service::{CatalogService, PurchaseWithItem};
pub use store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore};
