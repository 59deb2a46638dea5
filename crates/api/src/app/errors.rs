use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use tracify_core::DomainError;
use tracify_infra::StoreError;

/// Every failure a handler can report.
///
/// Each variant renders as `{"error": <code>, "message": <text>}` with a
/// matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Product not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
            ApiError::Validation(msg) => {
                json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
            }
            ApiError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "product store operation failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
