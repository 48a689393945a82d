//! Shared-secret admin sessions.
//!
//! `login` compares the submitted password against the configured secret in constant
//! time and issues an opaque token stored as `admin_session:<token>` with a TTL.
//! Admin routes accept the token from the `admin_session` cookie or an
//! `Authorization: Bearer` header. There is no lockout on repeated failures.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::Value;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::db::keys;
use crate::errors::AppError;
use crate::store::DocumentStore;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "admin_session";

/// Issues, checks and revokes admin session tokens.
pub struct SessionManager {
    store: Arc<dyn DocumentStore>,
    password: String,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn DocumentStore>, password: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            password: password.into(),
            ttl,
        }
    }

    /// Exchange the shared secret for a fresh session token.
    pub async fn login(&self, password: &str) -> Result<String, AppError> {
        if !constant_time_compare(password, &self.password) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        let token = Uuid::new_v4().simple().to_string();
        self.store
            .set_with_ttl(&keys::admin_session(&token), &Value::Bool(true), self.ttl)
            .await?;

        tracing::info!("Admin session started");
        Ok(token)
    }

    /// Whether `token` names a live session. Store failures count as logged out.
    pub async fn check_auth(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        match self.store.get(&keys::admin_session(token)).await {
            Ok(Some(Value::Bool(valid))) => valid,
            Ok(_) => false,
            Err(e) => {
                tracing::warn!("Session lookup failed: {}", e);
                false
            }
        }
    }

    /// Whether any of the presented tokens names a live session.
    pub async fn check_any(&self, tokens: &[String]) -> bool {
        for token in tokens {
            if self.check_auth(token).await {
                return true;
            }
        }
        false
    }

    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.store.del(&keys::admin_session(token)).await?;
        tracing::info!("Admin session ended");
        Ok(())
    }
}

/// Session tokens presented with a request, the cookie before the bearer header.
pub fn session_tokens(jar: &CookieJar, headers: &HeaderMap) -> Vec<String> {
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());

    cookie
        .into_iter()
        .chain(bearer)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Cookie remembering `token` in the browser.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that clears the session on the browser side.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Middleware gating admin routes on a live session.
pub async fn require_session(
    State(sessions): State<Arc<SessionManager>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let tokens = session_tokens(&jar, request.headers());

    if tokens.is_empty() {
        unauthorized_response("Admin login required")
    } else if sessions.check_any(&tokens).await {
        next.run(request).await
    } else {
        unauthorized_response("Session expired, please log in again")
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;

    fn manager(ttl: Duration) -> SessionManager {
        SessionManager::new(Arc::new(MemoryStore::new()), "open-sesame", ttl)
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_constant_time_compare_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "not-empty"));
    }

    #[tokio::test]
    async fn test_login_check_logout() {
        let sessions = manager(Duration::from_secs(60));

        assert!(matches!(
            sessions.login("wrong").await,
            Err(AppError::Unauthorized(_))
        ));

        let token = sessions.login("open-sesame").await.unwrap();
        assert_eq!(token.len(), 32);
        assert!(sessions.check_auth(&token).await);
        assert!(!sessions.check_auth("forged").await);
        assert!(!sessions.check_auth("").await);

        sessions.logout(&token).await.unwrap();
        assert!(!sessions.check_auth(&token).await);
    }

    #[tokio::test]
    async fn test_session_expires() {
        let sessions = manager(Duration::from_millis(50));
        let token = sessions.login("open-sesame").await.unwrap();
        assert!(sessions.check_auth(&token).await);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!sessions.check_auth(&token).await);
    }

    #[tokio::test]
    async fn test_store_down_means_logged_out() {
        let sessions = SessionManager::new(Arc::new(FailingStore), "pw", Duration::from_secs(60));
        assert!(!sessions.check_auth("anything").await);
        assert!(sessions.login("pw").await.is_err());
    }

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(session_tokens(&CookieJar::new(), &headers), vec!["abc123"]);

        let jar = CookieJar::new().add(session_cookie("from-cookie".to_string(), false));
        assert_eq!(session_tokens(&jar, &headers), vec!["from-cookie", "abc123"]);
        assert!(session_tokens(&CookieJar::new(), &HeaderMap::new()).is_empty());
    }

    #[tokio::test]
    async fn test_stale_cookie_does_not_hide_bearer() {
        let sessions = manager(Duration::from_secs(60));
        let live = sessions.login("open-sesame").await.unwrap();

        let tokens = vec!["expired-token".to_string(), live];
        assert!(sessions.check_any(&tokens).await);
        assert!(!sessions.check_any(&tokens[..1]).await);
    }
}
