use serde::{Deserialize, Serialize};

use tracify_core::{DomainError, DomainResult, ProductId};

/// Input shape for creating or replacing a product (no identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    /// Unit price in the catalog currency.
    pub price: f64,
    /// Units in stock.
    pub quantity: i64,
}

impl ProductCreate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        quantity: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            quantity,
        }
    }

    /// Reject values that cannot be stored or serialized back.
    ///
    /// No range rules apply: empty strings, negative prices and negative
    /// quantities are all accepted as given.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.price.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }

        Ok(())
    }
}

/// A persisted catalog record: `ProductCreate` plus the store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

impl Product {
    pub fn from_parts(id: ProductId, fields: ProductCreate) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            quantity: fields.quantity,
        }
    }

    /// Overwrite every mutable field. The id never changes.
    pub fn apply(&mut self, fields: ProductCreate) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.quantity = fields.quantity;
    }

    /// The mutable part of the record.
    pub fn fields(&self) -> ProductCreate {
        ProductCreate {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}
