//! HTTP error mapping
//!
//! Every failure leaves a handler as an [`ApiError`]: a status plus a
//! `{code, message}` body. Absence outcomes (`not_found`, `queue_empty`) use
//! 404 so clients can tell them apart from auth and validation failures.

use crate::models::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kvq_common::{AuthError, KvqError};

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    /// 401 `unauthorized`
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    /// 400 `bad_request`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// 404 `not_found`
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 404 `queue_empty`
    pub fn queue_empty(namespace: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "queue_empty",
            format!("no visible message in namespace {namespace:?}"),
        )
    }

    /// 500 `internal`; the detail is logged, not returned
    pub fn internal(detail: &str) -> Self {
        tracing::error!(error = detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<KvqError> for ApiError {
    fn from(err: KvqError) -> Self {
        match err {
            KvqError::Auth(auth) => auth.into(),
            KvqError::Validation(message) => Self::bad_request(message),
            KvqError::Internal(detail) => Self::internal(&detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Handler result
pub type ApiResult<T> = Result<T, ApiError>;
