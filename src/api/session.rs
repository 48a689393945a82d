//! Admin session endpoints and first-run seeding.

use axum::{extract::State, http::HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::{success, ApiResponse, ApiResult, JsonBody};
use crate::auth::{removal_cookie, session_cookie, session_tokens};
use crate::db::SeedReport;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    /// Returned on login for clients that send `Authorization: Bearer`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// POST /api/admin/login - Exchange the shared secret for a session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<SessionStatus>), AppError> {
    let token = state.sessions.login(&request.password).await?;
    let jar = jar.add(session_cookie(token.clone(), state.config.secure_cookies));

    Ok((
        jar,
        ApiResponse::new(SessionStatus {
            authenticated: true,
            token: Some(token),
        }),
    ))
}

/// POST /api/admin/logout - Drop the session, if any. The cookie is cleared even
/// when the store cannot be reached.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, ApiResponse<SessionStatus>) {
    for token in session_tokens(&jar, &headers) {
        if let Err(e) = state.sessions.logout(&token).await {
            tracing::warn!("Could not revoke session, clearing cookie anyway: {}", e);
        }
    }

    (
        jar.remove(removal_cookie()),
        ApiResponse::new(SessionStatus {
            authenticated: false,
            token: None,
        }),
    )
}

/// GET /api/admin/session - Whether the caller holds a live session.
pub async fn session_status(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> ApiResult<SessionStatus> {
    let authenticated = state
        .sessions
        .check_any(&session_tokens(&jar, &headers))
        .await;
    success(SessionStatus {
        authenticated,
        token: None,
    })
}

/// POST /api/admin/initialize - Seed empty collections and stats.
pub async fn initialize_content(State(state): State<AppState>) -> ApiResult<SeedReport> {
    success(state.repo.initialize_defaults().await?)
}
