//! In-memory session store - used when Redis is not configured or unreachable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::ports::{SessionError, SessionRecord, SessionStore};

struct Entry {
    record: SessionRecord,
    expires_at: Instant,
}

/// Sessions in a process-local map.
///
/// Sessions are lost on restart and are not shared between processes.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, SessionError> {
        let sessions = self.sessions.read().await;
        let Some(entry) = sessions.get(session_id) else {
            return Ok(None);
        };

        if entry.expires_at <= Instant::now() {
            drop(sessions);
            self.sessions.write().await.remove(session_id);
            return Ok(None);
        }

        Ok(Some(entry.record.clone()))
    }

    async fn save(
        &self,
        session_id: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        self.sessions.write().await.insert(
            session_id.to_string(),
            Entry {
                record: record.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn save_load_destroy() {
        let store = InMemorySessionStore::new();
        let record = SessionRecord {
            user_id: Some(Uuid::new_v4()),
            remember: true,
            ..Default::default()
        };

        store.save("s1", &record, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.load("s1").await.unwrap(), Some(record));

        store.destroy("s1").await.unwrap();
        assert_eq!(store.load("s1").await.unwrap(), None);
        store.destroy("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_gone() {
        let store = InMemorySessionStore::new();
        store
            .save("s1", &SessionRecord::default(), Duration::from_millis(10))
            .await
            .unwrap();
        store
            .save("s2", &SessionRecord::default(), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.load("s1").await.unwrap(), None);
        assert!(store.load("s2").await.unwrap().is_some());
    }
}
