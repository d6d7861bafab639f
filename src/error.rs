//! Typed error handling for the storefront API
//!
//! Every failure a handler can surface is a variant of [`ApiError`], which
//! knows its HTTP status code and a stable machine-readable error code.
//! Handlers return `Result<_, ApiError>` and axum renders the error through
//! the [`IntoResponse`] impl as an [`ErrorResponse`] JSON body.
//!
//! Propagation policy: validation errors are raised before any store access;
//! upstream failures are caught at the service boundary and either degrade to
//! cached data (reads) or surface as 500 (writes).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;

/// The main error type for the storefront API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required input, rejected before any store access
    #[error("{0}")]
    Validation(String),

    /// Entity absent from the store
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Order placement attempted against a cart with no lines
    #[error("cart is empty")]
    EmptyCart,

    /// The bounded fetch against the store did not complete in time
    #[error("upstream store timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// The store reported a failure
    #[error("upstream store failure: {0}")]
    Upstream(#[from] StoreError),

    /// A multi-step delete failed partway; the first step already took effect
    #[error("cascade failed while deleting {entity} '{id}' at step '{step}': {source}")]
    Cascade {
        entity: &'static str,
        id: String,
        step: &'static str,
        source: StoreError,
    },

    /// Should not happen in normal operation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Shorthand for a [`ApiError::Validation`] with the given message
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Shorthand for a [`ApiError::NotFound`] for the given entity
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::EmptyCart => StatusCode::BAD_REQUEST,
            ApiError::UpstreamTimeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Cascade { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::EmptyCart => "EMPTY_CART",
            ApiError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            ApiError::Upstream(_) => "UPSTREAM_FAILURE",
            ApiError::Cascade { .. } => "CASCADE_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
