//! Product persistence boundary.
//!
//! Handlers talk to a `ProductStore`; the backing storage (in-memory for
//! tests/dev, Postgres for deployments) is chosen at bootstrap.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use r#trait::{ProductStore, StoreError};
