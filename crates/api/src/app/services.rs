//! Service wiring: pick the catalog store from configuration.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use sweetshop_infra::{
    AppConfig, CatalogService, InMemoryCatalogStore, PostgresCatalogStore, StoreBackend,
};

/// Everything handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let catalog = match &config.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory catalog store");
            CatalogService::new(Arc::new(InMemoryCatalogStore::new()))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresCatalogStore::connect(database_url, *max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare catalog schema")?;
            tracing::info!(max_connections, "using postgres catalog store");
            CatalogService::new(Arc::new(store))
        }
    };

    if config.seed_catalog {
        let written = catalog
            .seed(Utc::now())
            .await
            .context("failed to seed default catalog")?;
        tracing::info!(written, "seeded default catalog at startup");
    }

    Ok(AppServices { catalog })
}
