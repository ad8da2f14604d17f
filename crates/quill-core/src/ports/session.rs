//! Server-side session storage port.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a one-shot message shown on the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Everything remembered about a visitor between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Set once the visitor has logged in.
    pub user_id: Option<Uuid>,
    /// Whether the login asked to outlive the browser session.
    #[serde(default)]
    pub remember: bool,
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
}

/// Session store - abstraction over session backends (Redis, in-memory).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session record.
    async fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Create or replace a record; it expires after `ttl` without another save.
    async fn save(
        &self,
        session_id: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError>;

    /// Drop a record. Unknown ids are not an error.
    async fn destroy(&self, session_id: &str) -> Result<(), SessionError>;
}

/// Session storage errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
