//! Startup seeding of the sample catalog.
//!
//! Invoked once during bootstrap with the store handle passed in.

use tracing::{debug, info, instrument};

use tracify_products::initial_products;

use crate::product_store::{ProductStore, StoreError};

/// What `seed_if_empty` did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty; this many sample products were inserted.
    Seeded(usize),
    /// The store already held rows; nothing was inserted.
    AlreadyPopulated,
}

/// Populate an empty store with the sample catalog.
///
/// Idempotent: a store holding any rows is left untouched. The check and the
/// inserts are a single atomic store operation (see
/// `ProductStore::insert_if_empty`), so concurrent startups seed at most once.
#[instrument(skip(store), err)]
pub async fn seed_if_empty<S>(store: &S) -> Result<SeedOutcome, StoreError>
where
    S: ProductStore + ?Sized,
{
    let inserted = store.insert_if_empty(initial_products()).await?;

    if inserted == 0 {
        debug!("product table already populated; skipping seed");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    info!(inserted, "database initialized with sample products");
    Ok(SeedOutcome::Seeded(inserted))
}
