//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection, schema bootstrap and seeding
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and input parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{http::HeaderValue, Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{build_services, AppServices};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>, allowed_origins: &[HeaderValue]) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::request_context))
            .layer(cors_layer(allowed_origins))
            .layer(Extension(services)),
    )
}

/// CORS for the browser frontend: a fixed origin list, any method, any
/// header, credentials allowed.
///
/// Wildcards are not permitted alongside credentials, so methods and headers
/// are mirrored from the preflight request instead.
pub fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins.iter().cloned()))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
