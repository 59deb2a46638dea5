//! Store wiring for the HTTP layer.

use std::sync::Arc;

use tracify_core::ProductId;
use tracify_infra::{
    seed_if_empty, InMemoryProductStore, PostgresProductStore, ProductStore, StoreError,
};
use tracify_products::{Product, ProductCreate};

use crate::config::ApiConfig;

/// Shared services handed to every handler.
///
/// Holds the store handle only; records are never cached here.
#[derive(Clone)]
pub struct AppServices {
    products: Arc<dyn ProductStore>,
}

impl AppServices {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    /// Services over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.products
    }

    pub async fn products_list(&self) -> Result<Vec<Product>, StoreError> {
        self.products.list().await
    }

    pub async fn products_get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.products.get(id).await
    }

    pub async fn products_create(&self, fields: ProductCreate) -> Result<Product, StoreError> {
        self.products.insert(fields).await
    }

    pub async fn products_update(
        &self,
        id: ProductId,
        fields: ProductCreate,
    ) -> Result<Option<Product>, StoreError> {
        self.products.update(id, fields).await
    }

    pub async fn products_delete(&self, id: ProductId) -> Result<bool, StoreError> {
        self.products.delete(id).await
    }
}

/// Build services from configuration.
///
/// Selects the store (Postgres when `DATABASE_URL` is set, in-memory
/// otherwise), creates the table if needed, then seeds it when enabled.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let store: Arc<dyn ProductStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresProductStore::connect(url, config.database_max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!("connected to postgres product store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory product store");
            Arc::new(InMemoryProductStore::new())
        }
    };

    if config.seed_on_startup {
        seed_if_empty(store.as_ref()).await?;
    }

    Ok(AppServices::new(store))
}
