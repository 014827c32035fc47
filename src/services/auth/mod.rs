/*
 * Responsibility
 * - AuthService: the one surface the outside world talks to
 * - exactly one strategy is active per service (tagged union, not a
 *   class hierarchy); gating is strategy-independent
 */
use axum::http::HeaderMap;
use chrono::Utc;
use tracing::error;

use crate::services::password::verify_password;
use crate::services::session::SessionResult;
use crate::services::users::{Principal, UserStore};

pub mod basic;
pub mod factory;
pub mod path_rules;
pub mod session;

pub use basic::BasicAuth;
pub use factory::build_auth_service;
pub use session::SessionAuth;

/// The one active authentication strategy.
pub enum Strategy {
    Basic(BasicAuth),
    Session(SessionAuth),
}

/// Verify `password` against every same-email candidate and return the
/// first one whose stored hash matches. Store failures log and resolve
/// to `None` like any other miss.
pub(crate) async fn resolve_with_password(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Option<Principal> {
    let candidates = match users.find_by_email(email).await {
        Ok(candidates) => candidates,
        Err(e) => {
            error!(error = %e, "user store lookup failed");
            return None;
        }
    };

    candidates
        .into_iter()
        .find(|candidate| verify_password(password, &candidate.password_hash))
}

/// Orchestrates gating, strategy dispatch and the session lifecycle.
///
/// Every public operation is total: malformed input and "not found"
/// resolve to `None`/`false`, and only session-storage failures are
/// surfaced as errors (so a refused login is never mistaken for a wrong
/// password).
pub struct AuthService {
    strategy: Strategy,
    excluded_paths: Vec<String>,
}

impl AuthService {
    pub fn new(strategy: Strategy, excluded_paths: Vec<String>) -> Self {
        Self {
            strategy,
            excluded_paths,
        }
    }

    /// Whether a request to `path` must carry credentials at all.
    pub fn requires_auth(&self, path: Option<&str>) -> bool {
        path_rules::requires_auth(path, &self.excluded_paths)
    }

    /// The authenticated principal for this request, or `None`.
    pub async fn current_user(&self, headers: &HeaderMap) -> Option<Principal> {
        match &self.strategy {
            Strategy::Basic(basic) => basic.current_user(headers).await,
            Strategy::Session(session) => session.current_user(headers, Utc::now()).await,
        }
    }

    /// Open a session for verified credentials.
    ///
    /// Under the Basic strategy there is no session lifecycle, so login
    /// degrades to unauthenticated rather than failing.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> SessionResult<Option<(Principal, String)>> {
        match &self.strategy {
            Strategy::Basic(_) => Ok(None),
            Strategy::Session(session) => session.login(email, password, Utc::now()).await,
        }
    }

    /// Close the request's session; `true` only if one was live.
    pub async fn logout(&self, headers: &HeaderMap) -> bool {
        match &self.strategy {
            Strategy::Basic(_) => false,
            Strategy::Session(session) => session.logout(headers, Utc::now()).await,
        }
    }
}
