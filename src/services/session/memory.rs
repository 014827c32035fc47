/*
 * Responsibility
 * - base in-memory session store: a shared id -> record map
 * - explicitly owned and injectable; nothing here is process-global
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::session::store::{
    SessionRecord, SessionResult, SessionStore, generate_session_id,
};

/// In-memory session map. Cheap to clone; clones share the same map.
///
/// The coarse `RwLock` gives create/destroy mutual exclusion with
/// concurrent lookups, which is all the volume here calls for.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full record access for the decorators (expiry needs `created_at`).
    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Re-insert a record wholesale, e.g. when the durable layer re-primes
    /// the cache from its backing store after a restart.
    pub fn prime(&self, record: SessionRecord) {
        self.sessions
            .write()
            .insert(record.session_id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Uuid, now: DateTime<Utc>) -> SessionResult<String> {
        let session_id = generate_session_id();
        let record = SessionRecord {
            session_id: session_id.clone(),
            user_id,
            created_at: now,
            updated_at: None,
        };
        self.sessions.write().insert(session_id.clone(), record);
        Ok(session_id)
    }

    async fn lookup(&self, session_id: &str, _now: DateTime<Utc>) -> SessionResult<Option<Uuid>> {
        Ok(self.sessions.read().get(session_id).map(|r| r.user_id))
    }

    async fn destroy(&self, session_id: &str, _now: DateTime<Utc>) -> SessionResult<bool> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }
}
