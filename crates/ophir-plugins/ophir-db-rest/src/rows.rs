//! Backend row shapes (snake_case columns) and their mapping to the
//! client-facing models. Each entity has exactly one mapping in each
//! direction, listing every column.

use chrono::{DateTime, Utc};
use ophir_core::error::AppError;
use ophir_core::models::{
    Category, Contact, ContactSubmission, Credential, Property, PropertyDraft, PropertyPatch,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ── contact_submissions ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContactRow {
    pub id: i64,
    pub document_id: String,
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            document_id: row.document_id,
            full_name: row.full_name,
            email: row.email,
            country: row.country,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactInsert<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub country: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
}

impl<'a> From<&'a ContactSubmission> for ContactInsert<'a> {
    fn from(submission: &'a ContactSubmission) -> Self {
        ContactInsert {
            full_name: &submission.full_name,
            email: &submission.email,
            country: &submission.country,
            subject: &submission.subject,
            message: &submission.message,
        }
    }
}

// ── properties ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PropertyRow {
    pub id: i64,
    pub document_id: String,
    pub property_id: Option<String>,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub rooms: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    /// Text or numeric depending on the column type
    pub surface: Option<Value>,
    pub surface_unit: Option<String>,
    pub price: Option<Value>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub parking: Option<i32>,
    pub category: String,
    pub images: Option<String>,
    pub visible: Option<bool>,
    pub exclusive: Option<bool>,
    pub visible_from: Option<String>,
    pub nearby_visits: Option<String>,
    pub views: Option<Value>,
    pub created_at: DateTime<Utc>,
}

fn text_of(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

impl TryFrom<PropertyRow> for Property {
    type Error = AppError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|_| {
            AppError::Upstream(format!(
                "property {} has unknown category '{}'",
                row.document_id, row.category
            ))
        })?;

        Ok(Property {
            id: row.id,
            property_id: row.property_id.unwrap_or_default(),
            name: row.name,
            location: row.location,
            description: row.description.unwrap_or_default(),
            rooms: row.rooms.unwrap_or(0),
            bedrooms: row.bedrooms.unwrap_or(0),
            bathrooms: row.bathrooms.unwrap_or(0),
            surface: text_of(row.surface).unwrap_or_else(|| "0".into()),
            surface_unit: row.surface_unit.unwrap_or_else(|| "m2".into()),
            price: text_of(row.price).unwrap_or_else(|| "0".into()),
            property_type: row.property_type,
            parking: row.parking.unwrap_or(0),
            category,
            images: row.images,
            visible: row.visible.unwrap_or(false),
            exclusive: row.exclusive.unwrap_or(false),
            visible_from: row.visible_from,
            nearby_visits: row.nearby_visits,
            views: text_of(row.views),
            created_at: row.created_at,
            document_id: row.document_id,
        })
    }
}

pub fn map_properties(rows: Vec<PropertyRow>) -> Result<Vec<Property>, AppError> {
    rows.into_iter().map(Property::try_from).collect()
}

pub fn insert_body(draft: &PropertyDraft) -> Value {
    json!({
        "property_id": draft.property_id,
        "name": draft.name,
        "location": draft.location,
        "description": draft.description,
        "rooms": draft.rooms,
        "bedrooms": draft.bedrooms,
        "bathrooms": draft.bathrooms,
        "surface": draft.surface,
        "surface_unit": draft.surface_unit,
        "price": draft.price,
        "type": draft.property_type,
        "parking": draft.parking,
        "category": draft.category.as_str(),
        "images": draft.images,
        "visible": draft.visible,
        "exclusive": draft.exclusive,
        "visible_from": draft.visible_from,
        "nearby_visits": draft.nearby_visits,
        "views": draft.views,
    })
}

/// Only the supplied fields, under their column names.
pub fn patch_body(patch: &PropertyPatch) -> Value {
    let mut body = Map::new();
    let mut put = |column: &str, value: Value| {
        body.insert(column.to_string(), value);
    };

    if let Some(v) = &patch.name {
        put("name", json!(v));
    }
    if let Some(v) = &patch.location {
        put("location", json!(v));
    }
    if let Some(v) = &patch.description {
        put("description", json!(v));
    }
    if let Some(v) = patch.rooms {
        put("rooms", json!(v));
    }
    if let Some(v) = patch.bedrooms {
        put("bedrooms", json!(v));
    }
    if let Some(v) = patch.bathrooms {
        put("bathrooms", json!(v));
    }
    if let Some(v) = &patch.surface {
        put("surface", json!(v));
    }
    if let Some(v) = &patch.surface_unit {
        put("surface_unit", json!(v));
    }
    if let Some(v) = &patch.price {
        put("price", json!(v));
    }
    if let Some(v) = &patch.property_type {
        put("type", json!(v));
    }
    if let Some(v) = patch.parking {
        put("parking", json!(v));
    }
    if let Some(v) = patch.category {
        put("category", json!(v.as_str()));
    }
    if let Some(v) = &patch.images {
        put("images", json!(v));
    }
    if let Some(v) = &patch.visible_from {
        put("visible_from", json!(v));
    }
    if let Some(v) = &patch.nearby_visits {
        put("nearby_visits", json!(v));
    }
    if let Some(v) = &patch.views {
        put("views", json!(v));
    }
    if let Some(v) = patch.visible {
        put("visible", json!(v));
    }
    if let Some(v) = patch.exclusive {
        put("exclusive", json!(v));
    }

    Value::Object(body)
}

// ── admin_credentials ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialRow {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = AppError;

    /// Rows without a role predate the dev tier and are admins.
    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_deref() {
            None | Some("") => ophir_core::models::Role::Admin,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Upstream(format!("credential for {} has unknown role '{raw}'", row.email))
            })?,
        };

        Ok(Credential {
            email: row.email,
            password: row.password,
            role,
        })
    }
}
