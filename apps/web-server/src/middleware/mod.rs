//! Middleware and request extractors.

pub mod auth;
pub mod error;
pub mod session;

pub use auth::{AccessDenied, AdminUser, AuthUser, CurrentUser};
pub use error::{AppError, AppResult};
pub use session::{SESSION_COOKIE, Session, SessionMiddleware};
