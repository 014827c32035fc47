//! Authentication gate: the seam the route layer attaches to.
//!
//! Excluded paths pass straight through. Everything else must resolve a
//! principal via the active strategy; the resolved identity lands in the
//! request extensions as [`AuthCtx`] and failures answer 401 with the
//! standard JSON error body.
use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use uuid::Uuid;

use crate::error::AuthError;
use crate::state::AppState;

/// Authenticated caller, as seen by downstream handlers.
#[derive(Clone, Debug)]
pub struct AuthCtx {
    pub user_id: Uuid,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Apply the gate to every route in `router`.
///
/// Ex:
/// ```ignore
/// let app = middleware::session_gate::apply(routes(), state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn cannot take a State extractor, so pass state explicitly.
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

async fn gate_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.auth.requires_auth(Some(original_uri.path())) {
        return Ok(next.run(req).await);
    }

    let principal = state
        .auth
        .current_user(req.headers())
        .await
        .ok_or(AuthError::Unauthorized)?;

    req.extensions_mut().insert(AuthCtx::new(principal.id));
    Ok(next.run(req).await)
}
