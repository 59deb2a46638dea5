//! Products domain module.
//!
//! This crate contains the catalog record shapes and their validation rules,
//! implemented as plain deterministic logic (no IO, no HTTP, no storage).

pub mod product;
pub mod seed;

pub use product::{Product, ProductCreate};
pub use seed::initial_products;
