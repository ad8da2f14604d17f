//! Persistence: SeaORM repositories and an in-memory fallback.

mod connections;
mod memory;

#[cfg(feature = "database")]
pub mod entity;
#[cfg(feature = "database")]
mod sea_base;
#[cfg(feature = "database")]
mod sea_repo;

#[cfg(feature = "database")]
pub use connections::connect;
pub use connections::DatabaseConfig;
pub use memory::{InMemoryPostRepository, InMemoryStore, InMemoryUserRepository};

#[cfg(feature = "database")]
pub use sea_base::SeaBaseRepository;
#[cfg(feature = "database")]
pub use sea_repo::{SeaPostRepository, SeaUserRepository};
