/*
 * Responsibility
 * - expiry decorator over the base in-memory store
 * - expiration is a read-time veil: lookups of a stale session return
 *   None, but the record stays in the map until destroy/prune
 */
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::services::session::memory::MemorySessionStore;
use crate::services::session::store::{SessionRecord, SessionResult, SessionStore};

/// Wraps a [`MemorySessionStore`] and veils records older than
/// `session_duration_secs`. A duration of zero (or anything non-positive)
/// disables expiry entirely, which is also the fallback for unparseable
/// configuration.
#[derive(Clone)]
pub struct ExpiringSessionStore {
    inner: Arc<MemorySessionStore>,
    session_duration_secs: i64,
}

impl ExpiringSessionStore {
    pub fn new(inner: Arc<MemorySessionStore>, session_duration_secs: i64) -> Self {
        Self {
            inner,
            session_duration_secs,
        }
    }

    pub fn session_duration_secs(&self) -> i64 {
        self.session_duration_secs
    }

    /// The store underneath; the durable decorator reaches through to it.
    pub fn inner(&self) -> &MemorySessionStore {
        &self.inner
    }

    /// Whether `record` is still live at `now`.
    pub fn is_live(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        if self.session_duration_secs <= 0 {
            return true;
        }
        let expires_at = record.created_at + Duration::seconds(self.session_duration_secs);
        now <= expires_at
    }
}

#[async_trait]
impl SessionStore for ExpiringSessionStore {
    async fn create(&self, user_id: Uuid, now: DateTime<Utc>) -> SessionResult<String> {
        self.inner.create(user_id, now).await
    }

    async fn lookup(&self, session_id: &str, now: DateTime<Utc>) -> SessionResult<Option<Uuid>> {
        let Some(record) = self.inner.get(session_id) else {
            return Ok(None);
        };

        if !self.is_live(&record, now) {
            debug!(session_id = %session_id, created_at = %record.created_at, "session expired");
            return Ok(None);
        }

        Ok(Some(record.user_id))
    }

    async fn destroy(&self, session_id: &str, now: DateTime<Utc>) -> SessionResult<bool> {
        // The owning user has to resolve through the same veil lookups
        // use, so an expired session reports false and stays for pruning.
        if self.lookup(session_id, now).await?.is_none() {
            return Ok(false);
        }
        self.inner.destroy(session_id, now).await
    }
}
