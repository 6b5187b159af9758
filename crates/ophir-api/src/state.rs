use std::sync::Arc;

use ophir_core::traits::{AuthProvider, Clock, ContactRepo, CredentialStore, MediaStore, PropertyRepo};

/// Shared across every request. Cloning only bumps the `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<dyn ContactRepo>,
    pub properties: Arc<dyn PropertyRepo>,
    pub credentials: Arc<dyn CredentialStore>,
    pub media: Arc<dyn MediaStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub clock: Arc<dyn Clock>,
    /// Adds `Secure` to the session cookie. On in production.
    pub secure_cookies: bool,
}
