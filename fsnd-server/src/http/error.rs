//! API error type and the JSON error envelope
//!
//! Every failure reaches the client as
//! `{"success": false, "error": <status>, "code": <tag>, "message": ...}`.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::StoreError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (422)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Unparseable request body (400)
    BadRequest { message: String },

    /// Route exists but not for this method (405)
    MethodNotAllowed,

    /// Authorization failed (status depends on the failure)
    Auth(AuthError),

    /// Storage failure (400, logged)
    Store(StoreError),

    /// Handler ran past the request timeout (408)
    Timeout { after: Duration },
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::Store(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Auth(e) => auth_status(e),
            Self::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::MissingHeader
        | AuthError::MalformedHeader(_)
        | AuthError::TokenExpired
        | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
        AuthError::InvalidHeader(_)
        | AuthError::DecodeFailure
        | AuthError::PermissionsNotFound => StatusCode::BAD_REQUEST,
        AuthError::PermissionDenied => StatusCode::FORBIDDEN,
        AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (code, message) = match self {
            Self::Validation(e) => ("validation_error", e.to_string()),
            Self::NotFound { resource, id } => {
                ("not_found", format!("{} '{}' not found", resource, id))
            }
            Self::BadRequest { message } => ("bad_request", message),
            Self::MethodNotAllowed => ("method_not_allowed", "method not allowed".to_owned()),
            Self::Auth(AuthError::KeySetUnavailable(detail)) => {
                tracing::warn!(%detail, "key set unavailable");
                (
                    "key_set_unavailable",
                    "authorization is temporarily unavailable".to_owned(),
                )
            }
            Self::Auth(e) => {
                tracing::debug!(error = %e, "authorization failed");
                (e.code(), e.to_string())
            }
            Self::Store(e) => {
                // Log the actual error, return generic message
                tracing::error!("Storage error: {}", e);
                ("bad_request", "the request could not be processed".to_owned())
            }
            Self::Timeout { after } => {
                tracing::warn!(timeout_ms = after.as_millis() as u64, "request timed out");
                (
                    "timeout",
                    format!("request timed out after {} ms", after.as_millis()),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::not_found(resource, id),
            StoreError::UnknownReference { field, id } => {
                Self::Validation(ValidationError::UnknownReference { field, id })
            }
            StoreError::Duplicate { field, value } => {
                Self::Validation(ValidationError::Duplicate { field, value })
            }
            _ => Self::Store(e),
        }
    }
}
