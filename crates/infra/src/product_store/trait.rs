use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tracify_core::ProductId;
use tracify_products::{Product, ProductCreate};

/// Product store operation error.
///
/// These are **infrastructure errors** (connectivity, queries, row decoding)
/// as opposed to domain errors (validation, not found). A missing row is not
/// an error at this layer: lookups return `Option` and deletes return `bool`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// Persistence for catalog products.
///
/// Each call is one unit of work: implementations acquire whatever session
/// they need (a pooled connection, a lock guard) when the call starts and
/// release it before returning, on success and on error alike. Nothing is held
/// across calls, so concurrent writes to the same id resolve as last write wins.
///
/// ## Identifiers
///
/// Ids are assigned by the store on `insert`, are unique for the lifetime of
/// the store, and are never reused after a delete.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, ascending by id.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Insert a new row and return it with its assigned id.
    async fn insert(&self, fields: ProductCreate) -> Result<Product, StoreError>;

    /// Replace every mutable field of an existing row.
    ///
    /// Returns `None` when no row has this id.
    async fn update(&self, id: ProductId, fields: ProductCreate) -> Result<Option<Product>, StoreError>;

    /// Remove a row. Returns `false` when no row has this id.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Insert `products` only if the store currently holds no rows.
    ///
    /// The emptiness check and the inserts happen atomically with respect to
    /// other callers of this method. Returns the number of rows inserted
    /// (zero when the store was already populated).
    async fn insert_if_empty(&self, products: Vec<ProductCreate>) -> Result<usize, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, fields: ProductCreate) -> Result<Product, StoreError> {
        (**self).insert(fields).await
    }

    async fn update(&self, id: ProductId, fields: ProductCreate) -> Result<Option<Product>, StoreError> {
        (**self).update(id, fields).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn insert_if_empty(&self, products: Vec<ProductCreate>) -> Result<usize, StoreError> {
        (**self).insert_if_empty(products).await
    }
}
