/// Factory: build `AuthService` from application `Config` plus the
/// injected collaborators (user store, optional durable backend).
use std::sync::Arc;

use crate::config::{AuthType, Config};
use crate::services::auth::{AuthService, BasicAuth, SessionAuth, Strategy};
use crate::services::session::{
    DurableSessionStore, ExpiringSessionStore, MemorySessionStore, SessionBackend, SessionStore,
};
use crate::services::users::UserStore;

pub fn build_auth_service(
    config: &Config,
    users: Arc<dyn UserStore>,
    session_backend: Option<Arc<dyn SessionBackend>>,
) -> Arc<AuthService> {
    let strategy = match config.auth_type {
        AuthType::Basic => Strategy::Basic(BasicAuth::new(users)),
        AuthType::Session => {
            let expiring = ExpiringSessionStore::new(
                Arc::new(MemorySessionStore::new()),
                config.session_duration_secs,
            );
            let sessions: Arc<dyn SessionStore> = match session_backend {
                Some(backend) => Arc::new(DurableSessionStore::new(expiring, backend)),
                None => Arc::new(expiring),
            };
            Strategy::Session(SessionAuth::new(
                users,
                sessions,
                config.session_cookie_name.clone(),
            ))
        }
    };

    Arc::new(AuthService::new(
        strategy,
        config.excluded_paths.clone(),
    ))
}
