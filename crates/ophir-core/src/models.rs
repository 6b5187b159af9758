//! # Domain Models
//!
//! These structs represent the core entities of Ophir Estate in the shape
//! served to browsers (camelCase). Backend row shapes live in the plugins
//! that talk to the backend.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};

/// Authorization tier carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Views and deletes contact submissions
    Admin,
    /// Manages property listings
    Dev,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dev => "dev",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "dev" => Ok(Role::Dev),
            other => Err(AppError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Business category of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Patrimoine,
    Offmarket,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Patrimoine => "patrimoine",
            Category::Offmarket => "offmarket",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"Patrimoine"` and `"OFFMARKET"` are accepted.
impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "patrimoine" => Ok(Category::Patrimoine),
            "offmarket" => Ok(Category::Offmarket),
            other => Err(AppError::Validation(format!("unknown category '{other}'"))),
        }
    }
}

/// Identity proven by a session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub role: Role,
    pub issued_at_millis: i64,
}

impl Session {
    pub fn is_dev(&self) -> bool {
        self.role == Role::Dev
    }
}

/// Operator credential stored server-side. Read-only from the app.
#[derive(Clone, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

// ── Contacts ────────────────────────────────────────────────────────────────

/// A lead submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub document_id: String,
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Raw body of `POST /api/contact`. The public form capitalizes every key
/// but `fullName`; lower-case spellings are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContact {
    #[serde(rename = "fullName", alias = "full_name", default)]
    pub full_name: Option<String>,
    #[serde(rename = "Email", alias = "email", default)]
    pub email: Option<String>,
    #[serde(rename = "Country", alias = "country", default)]
    pub country: Option<String>,
    #[serde(rename = "Subject", alias = "subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: Option<String>,
}

/// A contact that passed validation and may be written to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub subject: String,
    pub message: String,
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

/// `local@domain.tld` with no whitespace and exactly one `@` per side.
pub fn is_plausible_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

impl NewContact {
    pub fn validate(self) -> Result<ContactSubmission> {
        let required = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (Some(full_name), Some(email), Some(country), Some(subject), Some(message)) = (
            required(self.full_name),
            required(self.email),
            required(self.country),
            required(self.subject),
            required(self.message),
        ) else {
            return Err(AppError::Validation(
                "all required fields must be filled".into(),
            ));
        };

        if !is_plausible_email(&email) {
            return Err(AppError::Validation("invalid email".into()));
        }

        Ok(ContactSubmission {
            full_name,
            email,
            country,
            subject,
            message,
        })
    }
}

// ── Properties ──────────────────────────────────────────────────────────────

/// A listing as served to the public site and the dev dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub document_id: String,
    /// Human code, "P001", "P002", ...
    pub property_id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub rooms: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub surface: String,
    pub surface_unit: String,
    pub price: String,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub parking: i32,
    pub category: Category,
    /// Comma-joined object-store filenames
    pub images: Option<String>,
    pub visible: bool,
    pub exclusive: bool,
    pub visible_from: Option<String>,
    pub nearby_visits: Option<String>,
    pub views: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Filenames listed in `images`, in stored order.
    pub fn image_filenames(&self) -> Vec<&str> {
        self.images
            .as_deref()
            .map(|joined| {
                joined
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Filter applied by `PropertyRepo::list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyQuery {
    pub category: Option<Category>,
    pub visible_only: bool,
}

/// Raw body of `POST /api/properties`. The dashboard sends snake_case keys;
/// camelCase spellings are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewProperty {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rooms: Option<i32>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default, deserialize_with = "flex_string")]
    pub surface: Option<String>,
    #[serde(default, alias = "surfaceUnit")]
    pub surface_unit: Option<String>,
    #[serde(default, deserialize_with = "flex_string")]
    pub price: Option<String>,
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub parking: Option<i32>,
    #[serde(default, deserialize_with = "optional_category")]
    pub category: Option<Category>,
    #[serde(default)]
    pub images: Option<String>,
    #[serde(default, alias = "visibleFrom")]
    pub visible_from: Option<String>,
    #[serde(default, alias = "nearbyVisits")]
    pub nearby_visits: Option<String>,
    #[serde(default)]
    pub views: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub exclusive: Option<bool>,
}

/// A listing ready to be inserted. `property_id` is assigned by the caller
/// right before the write.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub property_id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub rooms: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub surface: String,
    pub surface_unit: String,
    pub price: String,
    pub property_type: Option<String>,
    pub parking: i32,
    pub category: Category,
    pub images: Option<String>,
    pub visible: bool,
    pub exclusive: bool,
    pub visible_from: Option<String>,
    pub nearby_visits: Option<String>,
    pub views: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NewProperty {
    pub fn validate(self) -> Result<PropertyDraft> {
        let name = non_blank(self.name);
        let location = non_blank(self.location);
        let (Some(name), Some(location), Some(category)) = (name, location, self.category) else {
            return Err(AppError::Validation(
                "name, location and category are required".into(),
            ));
        };

        Ok(PropertyDraft {
            property_id: String::new(),
            name,
            location,
            description: self.description.unwrap_or_default(),
            rooms: self.rooms.unwrap_or(0),
            bedrooms: self.bedrooms.unwrap_or(0),
            bathrooms: self.bathrooms.unwrap_or(0),
            surface: non_blank(self.surface).unwrap_or_else(|| "0".into()),
            surface_unit: non_blank(self.surface_unit).unwrap_or_else(|| "m2".into()),
            price: non_blank(self.price).unwrap_or_else(|| "0".into()),
            property_type: non_blank(self.property_type),
            parking: self.parking.unwrap_or(0),
            category,
            images: non_blank(self.images),
            visible: self.visible.unwrap_or(true),
            exclusive: self.exclusive.unwrap_or(false),
            visible_from: non_blank(self.visible_from),
            nearby_visits: non_blank(self.nearby_visits),
            views: non_blank(self.views),
        })
    }
}

/// Partial update for `PATCH /api/properties/{id}`.
///
/// `None` means "leave untouched". For nullable text columns the inner
/// `Option` distinguishes "set to null" (`Some(None)`, sent as `null` or `""`)
/// from a new value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rooms: Option<i32>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default, deserialize_with = "flex_string")]
    pub surface: Option<String>,
    #[serde(default, alias = "surfaceUnit")]
    pub surface_unit: Option<String>,
    #[serde(default, deserialize_with = "flex_string")]
    pub price: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "nullable")]
    pub property_type: Option<Option<String>>,
    #[serde(default)]
    pub parking: Option<i32>,
    #[serde(default, deserialize_with = "optional_category")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "nullable")]
    pub images: Option<Option<String>>,
    #[serde(default, alias = "visibleFrom", deserialize_with = "nullable")]
    pub visible_from: Option<Option<String>>,
    #[serde(default, alias = "nearbyVisits", deserialize_with = "nullable")]
    pub nearby_visits: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub views: Option<Option<String>>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub exclusive: Option<bool>,
}

impl PropertyPatch {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        *self == PropertyPatch::default()
    }

    /// Applies the supplied fields to `property` in place.
    pub fn apply_to(&self, property: &mut Property) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = &self.$field {
                    property.$field = value.clone();
                })*
            };
        }
        set!(
            name,
            location,
            description,
            rooms,
            bedrooms,
            bathrooms,
            surface,
            surface_unit,
            price,
            property_type,
            parking,
            category,
            images,
            visible_from,
            nearby_visits,
            views,
            visible,
            exclusive
        );
    }
}

/// `P` followed by `existing + 1`, zero-padded to three digits.
pub fn next_property_code(existing: u64) -> String {
    format!("P{:03}", existing + 1)
}

// ── Media ───────────────────────────────────────────────────────────────────

/// One image part of an upload, renamed and ready for the object store.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{now_millis}-{sanitized original}`.
pub fn stored_filename(now_millis: i64, original: &str) -> String {
    format!("{now_millis}-{}", sanitize_filename(original))
}

// ── Serde helpers ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Accepts `"12.5"`, `12.5` or `12` and keeps the text form.
fn flex_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }),
    )
}

/// Present field: `null` or blank becomes `Some(None)`.
fn nullable<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(non_blank(value)))
}

/// Blank is treated as absent; anything else must name a known category.
fn optional_category<'de, D>(deserializer: D) -> std::result::Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_blank(Option::<String>::deserialize(deserializer)?) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<Category>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
