//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `database` - PostgreSQL/SQLite repositories via SeaORM
//! - `redis` - Redis session store
//!
//! Without `database` the in-memory repositories are the only persistence.

pub mod auth;
pub mod database;
pub mod media;
pub mod session;

pub use auth::{Argon2PasswordService, JwtConfig, JwtSessionTokenService};
pub use database::{DatabaseConfig, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository};
pub use media::FsProfileImageStore;
pub use session::InMemorySessionStore;

#[cfg(feature = "database")]
pub use database::{SeaPostRepository, SeaUserRepository};

#[cfg(feature = "redis")]
pub use session::{RedisConfig, RedisSessionStore};
