use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::authz::AuthzError;
use crate::error::Error;

/// API error that converts to a proper HTTP response with a JSON
/// `{"error": ...}` body. Validation errors carry a `details` list with
/// every violated rule.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Vec<String>>,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 400 with the full list of violated rules, not just the first.
    #[must_use]
    pub fn validation(details: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "invalid policy".to_string(),
            details: Some(details),
        }
    }

    /// Bare 404 with an empty body, indistinguishable from an unregistered
    /// route. Used by the disabled-feature guard.
    #[must_use]
    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "")
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.message.is_empty() && self.details.is_none() {
            return self.status.into_response();
        }
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::TenantNotFound => ApiError::not_found("tenant not found"),
            Error::NotFound => ApiError::not_found("not found"),
            Error::DomainConflict => ApiError::conflict("tenant login domain already exists"),
            Error::AlreadyResolved => ApiError::conflict("registration already resolved"),
            Error::TokenUnknown | Error::TokenExpired { .. } => {
                ApiError::unauthorized("invalid or expired token")
            }
            Error::Unauthorized => ApiError::unauthorized("unauthorized"),
            Error::Forbidden => ApiError::forbidden("forbidden"),
            Error::Io(_) | Error::Config(_) => ApiError::internal("internal error"),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden(_) => ApiError::forbidden("Forbidden"),
            AuthzError::Unauthorized => ApiError::unauthorized("Unauthorized"),
        }
    }
}
