//! Infrastructure layer: product persistence and startup seeding.

pub mod product_store;
pub mod seed;

pub use product_store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
pub use seed::{seed_if_empty, SeedOutcome};
