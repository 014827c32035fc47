/*
 * Responsibility
 * - Authentication core for HTTP APIs: strategy dispatch (Basic / Session),
 *   session lifecycle (in-memory, expiring, durable) and the axum gate
 *   the route layer attaches to.
 * - The route/controller layer, user-record schema and log redaction live
 *   outside this crate.
 */
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::AuthError;
pub use services::auth::AuthService;
pub use services::users::Principal;
pub use state::AppState;

/// Install the global tracing subscriber.
///
/// Prefers RUST_LOG if set; otherwise uses a sensible default.
/// Ex: RUST_LOG=info,authgate=debug
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
