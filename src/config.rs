/*
 * Responsibility
 * - environment-driven configuration (strategy, cookie name, duration, ...)
 * - bad values degrade to safe defaults; nothing here fails startup
 */

pub const DEFAULT_SESSION_COOKIE: &str = "_my_session_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Basic,
    Session,
}

impl AuthType {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "basic" | "basic_auth" => Self::Basic,
            _ => Self::Session,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth_type: AuthType,
    pub session_cookie_name: String,
    /// Seconds a session stays live. Zero (also the fallback for an
    /// absent or unparseable value) disables expiry.
    pub session_duration_secs: i64,
    pub excluded_paths: Vec<String>,
    /// Present selects the durable session store.
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let auth_type = std::env::var("AUTH_TYPE")
            .map(|v| AuthType::parse(&v))
            .unwrap_or(AuthType::Session);

        let session_cookie_name =
            std::env::var("SESSION_NAME").unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string());

        let session_duration_secs = std::env::var("SESSION_DURATION")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);

        let excluded_paths = std::env::var("AUTH_EXCLUDED_PATHS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url = std::env::var("DATABASE_URL").ok();

        Self {
            auth_type,
            session_cookie_name,
            session_duration_secs,
            excluded_paths,
            database_url,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_type: AuthType::Session,
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            session_duration_secs: 0,
            excluded_paths: Vec::new(),
            database_url: None,
        }
    }
}
