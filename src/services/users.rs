/*
 * Responsibility
 * - Principal: the identity this crate resolves requests to
 * - UserStore: outbound boundary to the user-record service (read-only)
 * - MemoryUserStore: in-process implementation for tests and dev setups
 */
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::repos::error::RepoResult;

/// Authenticated identity, as read from the user store.
///
/// The stored hash stays opaque to this crate; it is only ever handed to
/// the password verifier, and never serialized outward.
#[derive(Clone, Debug, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Read access to user records.
///
/// Duplicate emails are allowed: `find_by_email` returns every candidate
/// and the caller decides which one verifies.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Vec<Principal>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Principal>>;
}

/// Shared in-memory user store. Cheap to clone (Arc inside).
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, Principal>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a principal. Returns its id for convenience.
    pub fn upsert(&self, principal: Principal) -> Uuid {
        let id = principal.id;
        self.users.write().insert(id, principal);
        id
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Vec<Principal>> {
        let users = self.users.read();
        let mut found: Vec<Principal> = users.values().filter(|u| u.email == email).cloned().collect();
        // Keep candidate order deterministic across runs.
        found.sort_by_key(|u| u.id);
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Principal>> {
        Ok(self.users.read().get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_email_returns_all_candidates() {
        let store = MemoryUserStore::new();
        for _ in 0..2 {
            store.upsert(Principal {
                id: Uuid::new_v4(),
                email: "dup@example.com".into(),
                password_hash: "x".into(),
            });
        }
        store.upsert(Principal {
            id: Uuid::new_v4(),
            email: "other@example.com".into(),
            password_hash: "x".into(),
        });

        let found = store.find_by_email("dup@example.com").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_id_misses_cleanly() {
        let store = MemoryUserStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
