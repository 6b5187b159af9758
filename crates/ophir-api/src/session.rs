//! Session cookie handling and the extractors that guard admin routes.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use ophir_core::error::AppError;
use ophir_core::models::Session;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin_session";

/// One day, in seconds.
pub const SESSION_MAX_AGE: u64 = 86_400;

fn cookie_attributes(max_age: u64, secure: bool) -> String {
    let mut attrs = format!("Path=/; Max-Age={max_age}; HttpOnly; SameSite=Strict");
    if secure {
        attrs.push_str("; Secure");
    }
    attrs
}

/// `Set-Cookie` value carrying a fresh token.
pub fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}={token}; {}",
        cookie_attributes(SESSION_MAX_AGE, secure)
    )
}

/// `Set-Cookie` value that makes the browser drop the session.
pub fn clear_cookie(secure: bool) -> String {
    format!("{SESSION_COOKIE}=; {}", cookie_attributes(0, secure))
}

/// Value of the `admin_session` cookie, if the request carries a non-empty one.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Any valid, unexpired session. Rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("no session cookie".into()))?;

        let session = state
            .auth
            .verify_token(&token, state.clock.now_millis())
            .inspect_err(|reason| debug!(%reason, "session refused"))?;

        Ok(AuthSession(session))
    }
}

/// A session holding the `dev` role. 401 without a session, 403 for admins.
#[derive(Debug, Clone)]
pub struct DevSession(pub Session);

impl FromRequestParts<AppState> for DevSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthSession(session) = AuthSession::from_request_parts(parts, state).await?;
        if !session.is_dev() {
            debug!(email = %session.email, "admin session refused on a dev route");
            return Err(AppError::Forbidden("developer access required".into()).into());
        }
        Ok(DevSession(session))
    }
}
