/*
 * Responsibility
 * - durability decorator over the expiring store
 * - create is all-or-nothing against the backend; lookup survives a
 *   process restart by falling back to the backend and re-priming the
 *   in-memory cache
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::repos::error::RepoResult;
use crate::services::session::expiring::ExpiringSessionStore;
use crate::services::session::store::{SessionError, SessionRecord, SessionResult, SessionStore};

/// Persistence seam for durable sessions.
///
/// Implementations are expected to be fallible and possibly slow; the
/// store treats every error as a hard persistence failure (create is
/// refused, never half-done).
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn insert(&self, record: &SessionRecord) -> RepoResult<()>;

    async fn fetch(&self, session_id: &str) -> RepoResult<Option<SessionRecord>>;

    /// Refresh last-seen tracking. Returns the number of rows touched.
    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Returns `true` iff a row existed and was deleted.
    async fn delete(&self, session_id: &str) -> RepoResult<bool>;
}

/// Sessions that outlive the process: every create is written through to
/// a [`SessionBackend`], every live lookup refreshes `updated_at` there,
/// and a cache miss falls back to the backend row.
#[derive(Clone)]
pub struct DurableSessionStore {
    inner: ExpiringSessionStore,
    backend: Arc<dyn SessionBackend>,
}

impl DurableSessionStore {
    pub fn new(inner: ExpiringSessionStore, backend: Arc<dyn SessionBackend>) -> Self {
        Self { inner, backend }
    }

    /// Best-effort last-seen refresh. A failed touch never invalidates
    /// the lookup that triggered it.
    async fn touch_backend(&self, session_id: &str, now: DateTime<Utc>) {
        if let Err(e) = self.backend.touch(session_id, now).await {
            warn!(session_id = %session_id, error = %e, "failed to refresh session last-seen");
        }
    }
}

#[async_trait]
impl SessionStore for DurableSessionStore {
    async fn create(&self, user_id: Uuid, now: DateTime<Utc>) -> SessionResult<String> {
        let session_id = self.inner.create(user_id, now).await?;

        let record = SessionRecord {
            session_id: session_id.clone(),
            user_id,
            created_at: now,
            updated_at: Some(now),
        };

        if let Err(e) = self.backend.insert(&record).await {
            // All-or-nothing: roll the cache entry back so the caller
            // never holds an id the backend does not know about.
            let _ = self.inner.inner().destroy(&session_id, now).await;
            return Err(SessionError::Backend(e));
        }

        Ok(session_id)
    }

    async fn lookup(&self, session_id: &str, now: DateTime<Utc>) -> SessionResult<Option<Uuid>> {
        // Cached record: the expiring layer owns the liveness decision.
        if let Some(record) = self.inner.inner().get(session_id) {
            if !self.inner.is_live(&record, now) {
                return Ok(None);
            }
            self.touch_backend(session_id, now).await;
            return Ok(Some(record.user_id));
        }

        // Cache miss (e.g. after a restart): consult the backend row and
        // apply the same veil to its original created_at.
        let Some(row) = self.backend.fetch(session_id).await? else {
            return Ok(None);
        };

        if !self.inner.is_live(&row, now) {
            debug!(session_id = %session_id, "durable session expired");
            return Ok(None);
        }

        let user_id = row.user_id;
        self.inner.inner().prime(row);
        self.touch_backend(session_id, now).await;

        Ok(Some(user_id))
    }

    async fn destroy(&self, session_id: &str, now: DateTime<Utc>) -> SessionResult<bool> {
        // Full round trip: the owning user must resolve before anything
        // is removed. Any missing link reports false.
        if self.lookup(session_id, now).await?.is_none() {
            return Ok(false);
        }

        self.backend.delete(session_id).await?;
        self.inner.inner().destroy(session_id, now).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::memory::MemorySessionStore;
    use parking_lot::RwLock;
    use std::collections::HashMap;

    /// Backend fake sharing rows across store instances, with a failure
    /// switch for the all-or-nothing path.
    #[derive(Default)]
    struct FakeBackend {
        rows: RwLock<HashMap<String, SessionRecord>>,
        fail_inserts: RwLock<bool>,
    }

    impl FakeBackend {
        fn set_fail_inserts(&self, fail: bool) {
            *self.fail_inserts.write() = fail;
        }

        fn row(&self, session_id: &str) -> Option<SessionRecord> {
            self.rows.read().get(session_id).cloned()
        }
    }

    #[async_trait]
    impl SessionBackend for FakeBackend {
        async fn insert(&self, record: &SessionRecord) -> RepoResult<()> {
            if *self.fail_inserts.read() {
                return Err(sqlx::Error::PoolClosed.into());
            }
            self.rows
                .write()
                .insert(record.session_id.clone(), record.clone());
            Ok(())
        }

        async fn fetch(&self, session_id: &str) -> RepoResult<Option<SessionRecord>> {
            Ok(self.row(session_id))
        }

        async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> RepoResult<u64> {
            let mut rows = self.rows.write();
            match rows.get_mut(session_id) {
                Some(row) => {
                    row.updated_at = Some(now);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete(&self, session_id: &str) -> RepoResult<bool> {
            Ok(self.rows.write().remove(session_id).is_some())
        }
    }

    fn durable(backend: Arc<FakeBackend>, duration_secs: i64) -> DurableSessionStore {
        let expiring =
            ExpiringSessionStore::new(Arc::new(MemorySessionStore::new()), duration_secs);
        DurableSessionStore::new(expiring, backend)
    }

    #[tokio::test]
    async fn create_persists_and_lookup_resolves() {
        let backend = Arc::new(FakeBackend::default());
        let store = durable(backend.clone(), 0);
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let sid = store.create(user_id, now).await.unwrap();
        assert!(backend.row(&sid).is_some());
        assert_eq!(store.lookup(&sid, now).await.unwrap(), Some(user_id));
    }

    #[tokio::test]
    async fn persistence_failure_refuses_the_session() {
        let backend = Arc::new(FakeBackend::default());
        let store = durable(backend.clone(), 0);
        backend.set_fail_inserts(true);
        let now = Utc::now();

        let err = store.create(Uuid::new_v4(), now).await;
        assert!(err.is_err());
        // Nothing left behind in the cache either.
        assert!(store.inner.inner().is_empty());
    }

    #[tokio::test]
    async fn lookup_survives_a_process_restart() {
        let backend = Arc::new(FakeBackend::default());
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let first_process = durable(backend.clone(), 0);
        let sid = first_process.create(user_id, now).await.unwrap();

        // Fresh cache, same durable backing.
        let second_process = durable(backend.clone(), 0);
        assert_eq!(
            second_process.lookup(&sid, now).await.unwrap(),
            Some(user_id)
        );
        // The row got re-primed into the new cache.
        assert_eq!(second_process.inner.inner().len(), 1);
    }

    #[tokio::test]
    async fn live_lookup_refreshes_last_seen() {
        let backend = Arc::new(FakeBackend::default());
        let store = durable(backend.clone(), 0);
        let now = Utc::now();

        let sid = store.create(Uuid::new_v4(), now).await.unwrap();
        let later = now + chrono::Duration::seconds(30);
        store.lookup(&sid, later).await.unwrap();

        assert_eq!(backend.row(&sid).unwrap().updated_at, Some(later));
    }

    #[tokio::test]
    async fn expiry_applies_to_backend_rows_too() {
        let backend = Arc::new(FakeBackend::default());
        let now = Utc::now();

        let first_process = durable(backend.clone(), 60);
        let sid = first_process.create(Uuid::new_v4(), now).await.unwrap();

        let second_process = durable(backend.clone(), 60);
        let stale = now + chrono::Duration::seconds(61);
        assert_eq!(second_process.lookup(&sid, stale).await.unwrap(), None);
        // The expired row is veiled, not evicted.
        assert!(backend.row(&sid).is_some());
    }

    #[tokio::test]
    async fn destroy_removes_both_layers() {
        let backend = Arc::new(FakeBackend::default());
        let store = durable(backend.clone(), 0);
        let now = Utc::now();

        let sid = store.create(Uuid::new_v4(), now).await.unwrap();
        assert!(store.destroy(&sid, now).await.unwrap());
        assert!(backend.row(&sid).is_none());
        assert_eq!(store.lookup(&sid, now).await.unwrap(), None);
        assert!(!store.destroy(&sid, now).await.unwrap());
    }
}
