/*
 * Responsibility
 * - shared context the gate middleware hangs off the Router
 * - Clone-cheap by construction (Arc inside)
 */
use std::sync::Arc;

use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}
