//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::error::{Result, SessionError};
use crate::models::{
    Contact, ContactSubmission, Credential, Property, PropertyDraft, PropertyPatch,
    PropertyQuery, Role, Session, UploadedImage,
};

/// Persistence contract for contact submissions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContactRepo: Send + Sync {
    /// All submissions, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Contact>>;
    async fn insert(&self, submission: ContactSubmission) -> Result<Contact>;
    async fn delete(&self, document_id: &str) -> Result<()>;
}

/// Persistence contract for property listings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PropertyRepo: Send + Sync {
    /// Listings matching `query`, newest first.
    async fn list(&self, query: PropertyQuery) -> Result<Vec<Property>>;
    /// Number of stored listings, visible or not.
    async fn count(&self) -> Result<u64>;
    async fn insert(&self, draft: PropertyDraft) -> Result<Property>;
    /// Returns the updated rows; empty when nothing matched.
    async fn update(&self, document_id: &str, patch: PropertyPatch) -> Result<Vec<Property>>;
    async fn delete(&self, document_id: &str) -> Result<()>;
}

/// Read-only access to operator credentials.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>>;
}

/// Object storage for listing images.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores the bytes under `image.filename`.
    async fn save_upload(&self, image: UploadedImage) -> Result<()>;
    /// Public URL the site uses to display a stored image.
    fn public_url(&self, filename: &str) -> String;
}

/// Session issuance and verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Builds the opaque cookie value for a fresh session.
    /// Fails with `Validation` when `email` cannot be carried by a token.
    fn issue_token(&self, email: &str, role: Role, issued_at_millis: i64) -> Result<String>;

    /// Decodes `token` and checks its age against `now_millis`.
    fn verify_token(&self, token: &str, now_millis: i64) -> std::result::Result<Session, SessionError>;

    /// Compares a login attempt against the stored secret.
    fn verify_password(&self, supplied: &str, stored: &str) -> bool;
}

/// Wall clock, in Unix milliseconds.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// `Clock` backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
