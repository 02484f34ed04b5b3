//!
//! # Custom Error Handling
//!
//! Two layers of errors live here. `ServiceError` is what the use-cases return:
//! business-rule violations plus wrapped storage, hashing and token failures.
//! `AppError` is the transport-facing error; it implements
//! `actix_web::error::ResponseError` so handlers can return it directly and get
//! a status code with a `{"error": ...}` JSON body.
//!
//! Controllers are the only place where a `ServiceError` becomes an `AppError`,
//! through the `From` implementation below.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::password::HashError;
use crate::auth::token::TokenError;
use crate::repository::StorageError;

/// Errors produced by the use-case layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("password length must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),
    /// Unknown username or wrong password; deliberately not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user '{0}' not found")]
    UserNotFound(String),
    #[error("user '{0}' is already an admin")]
    AlreadyAdmin(String),
    #[error("task with id '{0}' already exists")]
    DuplicateTaskId(String),
    #[error("task '{0}' not found")]
    TaskNotFound(String),
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Hashing(#[from] HashError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("{0}")]
    Internal(String),
}

/// Represents all errors surfaced over HTTP.
///
/// Each variant carries the message placed in the JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid credentials (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated but the role is insufficient (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Malformed request (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Input that deserialized but failed validation rules (HTTP 400).
    #[error("Validation Error: {0}")]
    ValidationError(String),
    /// The requested resource does not exist (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// The request collides with existing state (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.message()
        }))
    }
}

/// Maps use-case failures onto HTTP semantics.
///
/// Infrastructure failures are logged in full and reported with a generic body.
impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> AppError {
        match error {
            ServiceError::WeakPassword { .. } => AppError::BadRequest(error.to_string()),
            ServiceError::InvalidCredentials => AppError::Unauthorized(error.to_string()),
            ServiceError::UserNotFound(_) | ServiceError::TaskNotFound(_) => {
                AppError::NotFound(error.to_string())
            }
            ServiceError::DuplicateUsername(_)
            | ServiceError::AlreadyAdmin(_)
            | ServiceError::DuplicateTaskId(_) => AppError::Conflict(error.to_string()),
            ServiceError::Timeout(_)
            | ServiceError::Storage(_)
            | ServiceError::Hashing(_)
            | ServiceError::Token(_)
            | ServiceError::Internal(_) => {
                log::error!("request failed: {}", error);
                AppError::InternalServerError("Internal server error".into())
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let cases = [
            (AppError::Unauthorized("Invalid token".into()), 401),
            (AppError::Forbidden("Admins only".into()), 403),
            (AppError::BadRequest("Invalid input".into()), 400),
            (AppError::ValidationError("title: length".into()), 400),
            (AppError::NotFound("Resource not found".into()), 404),
            (AppError::Conflict("Duplicate".into()), 409),
            (AppError::InternalServerError("Server error".into()), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.error_response().status(), status, "{}", error);
        }
    }

    #[test]
    fn test_service_error_mapping() {
        let status = |e: ServiceError| AppError::from(e).status_code().as_u16();

        assert_eq!(status(ServiceError::WeakPassword { min: 4 }), 400);
        assert_eq!(status(ServiceError::InvalidCredentials), 401);
        assert_eq!(status(ServiceError::UserNotFound("x".into())), 404);
        assert_eq!(status(ServiceError::TaskNotFound("1".into())), 404);
        assert_eq!(status(ServiceError::DuplicateUsername("x".into())), 409);
        assert_eq!(status(ServiceError::AlreadyAdmin("x".into())), 409);
        assert_eq!(status(ServiceError::DuplicateTaskId("1".into())), 409);
        assert_eq!(status(ServiceError::Timeout(Duration::from_secs(10))), 500);
        assert_eq!(
            status(ServiceError::Storage(StorageError::Unavailable("down".into()))),
            500
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let error = AppError::from(ServiceError::Storage(StorageError::Unavailable(
            "connection refused to 10.0.0.3".into(),
        )));
        assert_eq!(error.message(), "Internal server error");
    }
}
