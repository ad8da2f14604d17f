//! Authentication ports: password hashing and session token signing.

use std::time::Duration;

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Signs the session id carried by the session cookie.
///
/// The token is tamper-evident and expires on its own; the session record it
/// names lives in a [`SessionStore`](super::SessionStore).
pub trait SessionTokenService: Send + Sync {
    /// Issue a token naming `session_id`, valid for `lifetime`.
    fn issue(&self, session_id: &str, lifetime: Duration) -> Result<String, AuthError>;

    /// Validate a token and return the session id it names.
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
