use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ophir_core::models::{Contact, NewContact};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiResult;
use crate::session::AuthSession;
use crate::state::AppState;

/// `GET /api/contacts`
pub async fn list(
    AuthSession(_): AuthSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Contact>>> {
    Ok(Json(state.contacts.list_newest_first().await?))
}

/// `POST /api/contact`. Public; nothing is written unless every field passes.
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<NewContact>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(form) = payload?;
    let submission = form.validate()?;
    let contact = state.contacts.insert(submission).await?;
    info!(document_id = %contact.document_id, "contact submitted");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "message received",
            "data": contact,
        })),
    ))
}

/// `DELETE /api/contacts/{id}`
pub async fn delete(
    AuthSession(session): AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.contacts.delete(&id).await?;
    info!(document_id = %id, by = %session.email, "contact deleted");
    Ok(Json(json!({ "success": true, "message": "contact deleted" })))
}
