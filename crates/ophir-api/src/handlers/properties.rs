use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ophir_core::error::AppError;
use ophir_core::models::{next_property_code, Category, NewProperty, Property, PropertyPatch, PropertyQuery};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiResult;
use crate::session::DevSession;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

impl ListParams {
    /// A category restricts the listing to visible rows; no category returns
    /// everything, hidden rows included.
    fn into_query(self) -> ApiResult<PropertyQuery> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Category>()?),
        };
        Ok(PropertyQuery {
            category,
            visible_only: category.is_some(),
        })
    }
}

/// `GET /api/properties[?category=…]`. Public.
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Property>>> {
    let Query(params) = params?;
    let query = params.into_query()?;
    Ok(Json(state.properties.list(query).await?))
}

/// `POST /api/properties`. Dev only.
pub async fn create(
    DevSession(session): DevSession,
    State(state): State<AppState>,
    payload: Result<Json<NewProperty>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = payload?;
    let mut draft = body.validate()?;

    // count-then-insert is not atomic; concurrent creates can share a code
    let existing = state.properties.count().await?;
    draft.property_id = next_property_code(existing);

    let property = state.properties.insert(draft).await?;
    info!(property_id = %property.property_id, by = %session.email, "property created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "propertyId": property.property_id,
            "data": property,
        })),
    ))
}

/// `PATCH /api/properties/{id}`. Dev only.
pub async fn update(
    DevSession(session): DevSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PropertyPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(AppError::Validation("no fields to update".into()).into());
    }

    let updated = state.properties.update(&id, patch).await?;
    info!(document_id = %id, rows = updated.len(), by = %session.email, "property updated");
    Ok(Json(json!({ "success": true, "data": updated })))
}

/// `DELETE /api/properties/{id}`. Dev only.
pub async fn delete(
    DevSession(session): DevSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.properties.delete(&id).await?;
    info!(document_id = %id, by = %session.email, "property deleted");
    Ok(Json(json!({ "success": true, "message": "property deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(category: Option<&str>) -> ListParams {
        ListParams {
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn category_implies_visible_only() {
        let query = params(Some("Offmarket")).into_query().unwrap();
        assert_eq!(query.category, Some(Category::Offmarket));
        assert!(query.visible_only);
    }

    #[test]
    fn blank_category_lists_everything() {
        for raw in [None, Some(""), Some("  ")] {
            assert_eq!(params(raw).into_query().unwrap(), PropertyQuery::default());
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(params(Some("chateaux")).into_query().is_err());
    }
}
