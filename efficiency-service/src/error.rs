//! Service error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use efficiency_core::ValidationError;
use serde::Serialize;
use time::OffsetDateTime;

use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid input data: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    NotFound(String),

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Serializable error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_code: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Store(_) => "STORE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => {
                metrics::counter!("efficiency_validation_rejected_total").increment(1);
                tracing::info!(error = %self, "rejected invalid request");
            }
            ApiError::NotFound(_) => {
                metrics::counter!("efficiency_not_found_total").increment(1);
            }
            ApiError::Unauthorized => {}
            ApiError::Store(e) => {
                metrics::counter!("efficiency_store_errors_total").increment(1);
                tracing::error!(error = %e, "store operation failed");
            }
        }

        let body = ErrorResponse {
            detail: self.to_string(),
            error_code: self.code().to_string(),
            timestamp: OffsetDateTime::now_utc(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
