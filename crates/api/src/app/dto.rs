use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;

use tracify_core::ProductId;
use tracify_products::ProductCreate;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /products/` and `PUT /products/{id}`.
pub type ProductRequest = ProductCreate;

/// Unwrap a JSON body and reject values the store cannot hold.
///
/// Malformed JSON, missing or mistyped fields and non-finite prices all
/// surface as `ApiError::Validation`.
pub fn validated_product(
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<ProductCreate, ApiError> {
    let Json(fields) = body?;
    fields.validate()?;
    Ok(fields)
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    Ok(raw.parse::<ProductId>()?)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn product_deleted() -> Self {
        Self {
            message: "Product deleted successfully",
        }
    }
}
