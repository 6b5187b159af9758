//! # ophir-ui
//!
//! Dashboard screens as plain state machines. Each screen owns its state and
//! exposes one `update` function; network calls are returned as [`Effect`]s
//! for the shell to run, and their outcomes come back as messages.

pub mod contacts;
pub mod display;
pub mod properties;

use bytes::Bytes;
use ophir_core::models::{NewProperty, PropertyPatch, Role};
use serde::Serialize;

/// Lifecycle of a remotely loaded collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Banner shown above a screen after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Page the shell should navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    /// The contact inbox, where admins land.
    Inbox,
}

/// Outcome of `GET /api/auth/check`: the session role, or `None` on 401.
pub type SessionStatus = Option<Role>;

/// A file picked in the listing form, not yet uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A request the shell must perform on behalf of a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CheckSession,
    Logout,
    FetchContacts,
    DeleteContact(String),
    FetchProperties,
    /// Multipart `images` parts, in order.
    UploadImages(Vec<PendingFile>),
    CreateProperty(NewProperty),
    PatchProperty { document_id: String, patch: PropertyPatch },
    DeleteProperty(String),
}

impl Effect {
    /// HTTP method and path of the API call.
    pub fn route(&self) -> (&'static str, String) {
        match self {
            Effect::CheckSession => ("GET", "/api/auth/check".to_string()),
            Effect::Logout => ("POST", "/api/auth/logout".to_string()),
            Effect::FetchContacts => ("GET", "/api/contacts".to_string()),
            Effect::DeleteContact(id) => ("DELETE", format!("/api/contacts/{id}")),
            Effect::FetchProperties => ("GET", "/api/properties".to_string()),
            Effect::UploadImages(_) => ("POST", "/api/upload".to_string()),
            Effect::CreateProperty(_) => ("POST", "/api/properties".to_string()),
            Effect::PatchProperty { document_id, .. } => {
                ("PATCH", format!("/api/properties/{document_id}"))
            }
            Effect::DeleteProperty(id) => ("DELETE", format!("/api/properties/{id}")),
        }
    }
}
