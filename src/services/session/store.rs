/*
 * Responsibility
 * - the session lifecycle contract every store variant implements
 * - SessionRecord: what a store holds per session id
 *
 * A session id moves through: non-existent -> active (create) ->
 * possibly expired-but-present (time passes) -> removed (destroy/prune).
 * Expired is observationally identical to non-existent for every read.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::repos::error::RepoError;

/// Storage failures only. "Not found" is not an error anywhere in this
/// family; it comes back as `Ok(None)` / `Ok(false)` so callers cannot
/// tell a missing session from a malformed one.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session persistence failed")]
    Backend(#[from] RepoError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// One session as held by a store.
///
/// `updated_at` is last-seen tracking and only maintained by the durable
/// variant; the in-memory stores leave it `None`.
#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Keyed session store: opaque session id -> owning user.
///
/// `now` is always supplied by the caller, both so the expiring decorator
/// has a clock and so tests can move time without sleeping.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Mint a fresh, unguessable session id for `user_id` and record the
    /// mapping. The id is never derived from user data.
    async fn create(&self, user_id: Uuid, now: DateTime<Utc>) -> SessionResult<String>;

    /// Resolve a session id to its owning user, or `None` if the id is
    /// unknown or no longer live.
    async fn lookup(&self, session_id: &str, now: DateTime<Utc>) -> SessionResult<Option<Uuid>>;

    /// Remove a session. `true` iff a live record existed and was removed;
    /// destroying an already-gone (or expired) session reports `false`,
    /// not an error.
    async fn destroy(&self, session_id: &str, now: DateTime<Utc>) -> SessionResult<bool>;
}

/// Fresh opaque session id: 128 random bits rendered as a string.
pub(crate) fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
