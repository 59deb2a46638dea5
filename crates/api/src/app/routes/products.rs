use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use tracify_products::Product;

use crate::app::dto::{self, MessageResponse, ProductRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[instrument(name = "handler::list_products", skip(services))]
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = services.products_list().await?;
    Ok(Json(products))
}

#[instrument(name = "handler::get_product", skip(services))]
pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    services
        .products_get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[instrument(name = "handler::create_product", skip(services, body))]
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let fields = dto::validated_product(body)?;
    let created = services.products_create(fields).await?;
    tracing::info!(product_id = %created.id, "product created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(name = "handler::update_product", skip(services, body))]
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let fields = dto::validated_product(body)?;
    services
        .products_update(id, fields)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[instrument(name = "handler::delete_product", skip(services))]
pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    if !services.products_delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(MessageResponse::product_deleted()))
}
