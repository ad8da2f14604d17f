//! Session stores - Redis and in-memory fallback.

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::InMemorySessionStore;
#[cfg(feature = "redis")]
pub use redis::{RedisConfig, RedisSessionStore};

/// Key under which a session id is stored.
pub(crate) fn session_key(session_id: &str) -> String {
    format!("quill:session:{session_id}")
}
