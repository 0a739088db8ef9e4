use std::fmt;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::InventoryError;
use crate::identity::{AuthError, DirectoryError};

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or rejected bearer token.
    Auth(AuthError),
    /// A membership or catalog operation failed.
    Inventory(InventoryError),
    /// The identity directory could not be reached.
    DirectoryUnavailable(DirectoryError),
    /// Body or path could not be decoded.
    BadRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Inventory(e) => write!(f, "{}", e),
            ApiError::DirectoryUnavailable(_) => write!(f, "user directory unavailable"),
            ApiError::BadRequest(msg) => write!(f, "bad request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Auth(e) => Some(e),
            ApiError::Inventory(e) => Some(e),
            ApiError::DirectoryUnavailable(e) => Some(e),
            ApiError::BadRequest(_) => None,
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Auth(_) => 401,
            ApiError::Inventory(e) => e.status_code(),
            ApiError::DirectoryUnavailable(_) => 503,
            ApiError::BadRequest(_) => 400,
        }
    }

    pub(crate) fn forbidden(msg: &str) -> Self {
        ApiError::Inventory(InventoryError::Forbidden(msg.to_string()))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Inventory(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, source = ?std::error::Error::source(&self), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
