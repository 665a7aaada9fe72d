//! HTTP boundary errors
//!
//! Every handler returns [`ApiError`] on failure. Authorization failures keep
//! their own envelope (with `description`); everything else answers
//! `{"success": false, "error": <status>, "message": <text>}`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use coffeeshop_auth::AuthFailure;
use http::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::store::StoreError;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Error surfaced by a route handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body is not valid JSON or could not be read
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown route, unknown id or empty catalog
    #[error("Resource not found")]
    NotFound,

    /// Route exists but not for this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body is well-formed but cannot be applied
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Authorization gate refused the request
    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthFailure),
}

impl ApiError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Auth(failure) => failure.status(),
        }
    }

    /// Client-facing message. Authorization failures report their own
    /// description.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(_) => "bad request",
            Self::NotFound => "resource not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::Unprocessable(_) => "unprocessable",
            Self::Auth(failure) => failure.description(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => Self::NotFound,
            StoreError::DuplicateTitle { .. } => Self::Unprocessable(error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Auth(failure) => failure.into_response(),
            other => {
                debug!(status = status.as_u16(), error = %other, "Request rejected");
                let body = json!({
                    "success": false,
                    "error": status.as_u16(),
                    "message": other.message(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}
