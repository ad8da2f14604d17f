//! Password hashing and session token signing.

mod password;
mod session_token;

pub use password::Argon2PasswordService;
pub use session_token::{JwtConfig, JwtSessionTokenService};
