use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ophir_core::error::{AppError, SessionError};
use ophir_core::models::Role;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::session::{clear_cookie, session_cookie, session_token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Role,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let filled = |v: Option<String>| v.filter(|v| !v.is_empty());
    let (Some(email), Some(password)) = (filled(body.email), filled(body.password)) else {
        return Err(AppError::Validation("email and password are required".into()).into());
    };

    let credential = state
        .credentials
        .find_by_email(&email)
        .await?
        .filter(|c| state.auth.verify_password(&password, &c.password));

    let Some(credential) = credential else {
        warn!(%email, "login refused");
        return Err(AppError::Unauthorized("invalid credentials".into()).into());
    };

    let token = state
        .auth
        .issue_token(&credential.email, credential.role, state.clock.now_millis())?;
    info!(email = %credential.email, role = %credential.role, "login");

    Ok((
        [(SET_COOKIE, session_cookie(&token, state.secure_cookies))],
        Json(LoginResponse {
            success: true,
            role: credential.role,
        }),
    ))
}

/// `POST /api/auth/logout`. Always succeeds.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_cookie(state.secure_cookies))],
        Json(json!({ "success": true })),
    )
}

/// `GET /api/auth/check`
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = session_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "authenticated": false }))).into_response();
    };

    match state.auth.verify_token(&token, state.clock.now_millis()) {
        Ok(session) => Json(json!({
            "authenticated": true,
            "email": session.email,
            "role": session.role,
        }))
        .into_response(),
        Err(SessionError::Expired) => {
            debug!("expired session presented");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "authenticated": false, "reason": "expired" })),
            )
                .into_response()
        }
        Err(SessionError::Malformed) => {
            (StatusCode::UNAUTHORIZED, Json(json!({ "authenticated": false }))).into_response()
        }
    }
}
