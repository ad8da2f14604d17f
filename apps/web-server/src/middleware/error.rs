//! HTTP error type rendered as an HTML error page.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use quill_core::error::{DomainError, RepoError};
use quill_core::ports::MediaError;

use crate::views;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Forbidden,
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::NotFound(_) => "That page does not exist.",
            AppError::BadRequest(detail) => detail.as_str(),
            AppError::Forbidden => "You don't have permission to access this page.",
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "Something went wrong. Please try again later."
            }
        };
        views::error_page(self.status_code(), message)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::Invalid(errors) => AppError::BadRequest(errors.to_string()),
            DomainError::InvalidCredentials => {
                AppError::BadRequest("Incorrect email or password".to_string())
            }
            DomainError::PasswordMismatch => AppError::BadRequest("Passwords must match".to_string()),
            DomainError::Repo(e) => e.into(),
            DomainError::Media(MediaError::NotFound) => {
                AppError::NotFound("Image not found".to_string())
            }
            DomainError::Media(e) => AppError::Internal(e.to_string()),
            DomainError::Auth(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Internal(format!("template error: {err:?}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
