//! Server-level error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::db::DbError;

/// Errors raised outside the feature slices
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(#[from] DbError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::DatabaseUnavailable(ref e) => {
                tracing::error!("Database health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database is unreachable".to_string(),
                )
            },
            AppError::NotFound(ref path) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", format!("No route for {}", path))
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, AppError>;
