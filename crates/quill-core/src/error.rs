//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::ports::{AuthError, MediaError};
use crate::validation::FieldErrors;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    /// Input failed validation; the errors are meant to be shown inline.
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Passwords must match")]
    PasswordMismatch,

    /// The acting user may not touch this entity.
    #[error("Not permitted")]
    Forbidden,

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::Invalid(errors)
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique constraint was violated; carries the offending column when known.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}
