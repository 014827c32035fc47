/*
 * Responsibility
 * - session strategy: cookie -> session store -> user store
 * - login/logout drive the session lifecycle; every resolution failure
 *   degrades to "unauthenticated"
 */
use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::services::auth::resolve_with_password;
use crate::services::session::{SessionResult, SessionStore};
use crate::services::users::{Principal, UserStore};

/// Session authentication strategy.
///
/// Credentials are presented once at login; afterwards the opaque
/// session id travels as a named cookie and is the only thing a request
/// needs to carry.
#[derive(Clone)]
pub struct SessionAuth {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    cookie_name: String,
}

impl SessionAuth {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        cookie_name: String,
    ) -> Self {
        Self {
            users,
            sessions,
            cookie_name,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Value of the configured session cookie, if the request carries it.
    pub fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        let raw = headers.get(header::COOKIE)?.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == self.cookie_name).then(|| value.to_string())
        })
    }

    /// Resolve the request's session cookie to a principal.
    pub async fn current_user(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Option<Principal> {
        let session_id = self.session_cookie(headers)?;

        let user_id = match self.sessions.lookup(&session_id, now).await {
            Ok(user_id) => user_id?,
            Err(e) => {
                error!(error = %e, "session lookup failed");
                return None;
            }
        };

        self.find_principal(user_id).await
    }

    /// Verify credentials and open a session.
    ///
    /// `Ok(None)` is "unauthenticated" (unknown email or wrong password,
    /// indistinguishable on purpose); a storage failure refuses the login
    /// outright and surfaces as `Err`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> SessionResult<Option<(Principal, String)>> {
        let Some(principal) = resolve_with_password(self.users.as_ref(), email, password).await
        else {
            debug!("login rejected");
            return Ok(None);
        };

        let session_id = self.sessions.create(principal.id, now).await?;
        info!(user_id = %principal.id, "session opened");

        Ok(Some((principal, session_id)))
    }

    /// Close the request's session. `true` only if a live session
    /// actually existed and was removed.
    pub async fn logout(&self, headers: &HeaderMap, now: DateTime<Utc>) -> bool {
        let Some(session_id) = self.session_cookie(headers) else {
            return false;
        };

        match self.sessions.destroy(&session_id, now).await {
            Ok(destroyed) => {
                if destroyed {
                    info!("session closed");
                }
                destroyed
            }
            Err(e) => {
                error!(error = %e, "session destroy failed");
                false
            }
        }
    }

    async fn find_principal(&self, user_id: Uuid) -> Option<Principal> {
        match self.users.find_by_id(user_id).await {
            Ok(principal) => principal,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "user store lookup failed");
                None
            }
        }
    }
}
