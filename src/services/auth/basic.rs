/*
 * Responsibility
 * - Basic-scheme credential extraction and principal resolution
 * - every step is total: malformed input at any point resolves to None,
 *   indistinguishable from "no such user" for the caller
 */
use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::debug;

use crate::services::auth::resolve_with_password;
use crate::services::users::{Principal, UserStore};

/// Raw value of the Authorization header, if it carries valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()
}

/// The base64 payload after the literal `"Basic "` scheme prefix.
pub fn extract_encoded_credentials(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Basic ")
}

/// Decode the payload as base64-wrapped UTF-8 text.
/// Malformed base64 and invalid UTF-8 both come back as `None`.
pub fn decode_credentials(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split `email:password` at the FIRST colon, so passwords may contain
/// colons themselves. No colon at all -> `None`.
pub fn split_credentials(decoded: &str) -> Option<(String, String)> {
    decoded
        .split_once(':')
        .map(|(email, password)| (email.to_string(), password.to_string()))
}

/// Basic authentication strategy: credentials travel on every request,
/// there is no session lifecycle.
#[derive(Clone)]
pub struct BasicAuth {
    users: Arc<dyn UserStore>,
}

impl BasicAuth {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// First same-email candidate whose stored hash verifies.
    ///
    /// Linear over the candidates; email lookups return at most a
    /// handful of rows, so this stays O(k) in verifying candidates.
    pub async fn resolve_principal(&self, email: &str, password: &str) -> Option<Principal> {
        resolve_with_password(self.users.as_ref(), email, password).await
    }

    /// The end-to-end chain: header -> scheme prefix -> base64 -> split
    /// -> verified principal, short-circuiting to `None` at the first
    /// missing or malformed link.
    pub async fn current_user(&self, headers: &HeaderMap) -> Option<Principal> {
        let header_value = authorization_header(headers)?;
        let encoded = extract_encoded_credentials(header_value)?;
        let decoded = decode_credentials(encoded)?;
        let Some((email, password)) = split_credentials(&decoded) else {
            debug!("basic credentials missing separator");
            return None;
        };

        self.resolve_principal(&email, &password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::password::hash_password;
    use crate::services::users::MemoryUserStore;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn basic_header(email: &str, password: &str) -> HeaderMap {
        let encoded = STANDARD.encode(format!("{email}:{password}"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        headers
    }

    #[test]
    fn scheme_prefix_is_required() {
        assert_eq!(extract_encoded_credentials("Bearer abc"), None);
        assert_eq!(extract_encoded_credentials("basic abc"), None);
        assert_eq!(extract_encoded_credentials("Basic abc"), Some("abc"));
    }

    #[test]
    fn bad_base64_decodes_to_none() {
        assert_eq!(decode_credentials("not base64!!"), None);
    }

    #[test]
    fn invalid_utf8_decodes_to_none() {
        let encoded = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(decode_credentials(&encoded), None);
    }

    #[test]
    fn decode_round_trips_through_base64() {
        let plain = "bob@x.com:secret";
        let encoded = STANDARD.encode(plain);
        assert_eq!(decode_credentials(&encoded).as_deref(), Some(plain));
    }

    #[test]
    fn split_uses_the_first_colon() {
        assert_eq!(
            split_credentials("bob@x.com:secret"),
            Some(("bob@x.com".into(), "secret".into()))
        );
        // Passwords may contain colons.
        assert_eq!(
            split_credentials("bob@x.com:pa:ss:wd"),
            Some(("bob@x.com".into(), "pa:ss:wd".into()))
        );
        assert_eq!(split_credentials("nocolonhere"), None);
    }

    #[tokio::test]
    async fn resolves_the_matching_duplicate_email_candidate() {
        let users = MemoryUserStore::new();
        users.upsert(Principal {
            id: Uuid::new_v4(),
            email: "dup@x.com".into(),
            password_hash: hash_password("first-pw").unwrap(),
        });
        let second_id = users.upsert(Principal {
            id: Uuid::new_v4(),
            email: "dup@x.com".into(),
            password_hash: hash_password("second-pw").unwrap(),
        });

        let auth = BasicAuth::new(Arc::new(users));
        let resolved = auth.resolve_principal("dup@x.com", "second-pw").await;
        assert_eq!(resolved.map(|p| p.id), Some(second_id));

        assert!(auth.resolve_principal("dup@x.com", "neither").await.is_none());
        assert!(auth.resolve_principal("nobody@x.com", "x").await.is_none());
    }

    #[tokio::test]
    async fn end_to_end_chain_short_circuits() {
        let users = MemoryUserStore::new();
        let id = users.upsert(Principal {
            id: Uuid::new_v4(),
            email: "bob@x.com".into(),
            password_hash: hash_password("secret").unwrap(),
        });
        let auth = BasicAuth::new(Arc::new(users));

        let ok = auth.current_user(&basic_header("bob@x.com", "secret")).await;
        assert_eq!(ok.map(|p| p.id), Some(id));

        // No header, wrong scheme, wrong password: all plain None.
        assert!(auth.current_user(&HeaderMap::new()).await.is_none());
        let mut bearer = HeaderMap::new();
        bearer.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer x"));
        assert!(auth.current_user(&bearer).await.is_none());
        assert!(
            auth.current_user(&basic_header("bob@x.com", "wrong"))
                .await
                .is_none()
        );
    }
}
