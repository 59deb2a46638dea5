use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use tracify_core::ProductId;
use tracify_products::{Product, ProductCreate};

use super::r#trait::{ProductStore, StoreError};

#[derive(Debug)]
struct Table {
    /// Next id to hand out; mirrors a serial column (never reused).
    next_id: i64,
    rows: BTreeMap<ProductId, Product>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl Table {
    fn insert(&mut self, fields: ProductCreate) -> Product {
        let id = ProductId::new(self.next_id);
        self.next_id += 1;

        let product = Product::from_parts(id, fields);
        self.rows.insert(id, product.clone());
        product
    }
}

/// In-memory product store.
///
/// Intended for tests/dev. Each call holds the table lock for its whole
/// duration, which plays the role of the per-request session.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    table: RwLock<Table>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory product table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory product table lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let table = self.read()?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let table = self.read()?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert(&self, fields: ProductCreate) -> Result<Product, StoreError> {
        let mut table = self.write()?;
        Ok(table.insert(fields))
    }

    async fn update(&self, id: ProductId, fields: ProductCreate) -> Result<Option<Product>, StoreError> {
        let mut table = self.write()?;
        Ok(table.rows.get_mut(&id).map(|product| {
            product.apply(fields);
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut table = self.write()?;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let table = self.read()?;
        Ok(table.rows.len() as u64)
    }

    async fn insert_if_empty(&self, products: Vec<ProductCreate>) -> Result<usize, StoreError> {
        // Write lock held across the check and the inserts.
        let mut table = self.write()?;
        if !table.rows.is_empty() {
            return Ok(0);
        }

        let inserted = products.len();
        for fields in products {
            table.insert(fields);
        }
        Ok(inserted)
    }
}
