//! # ophir-store-memory
//!
//! In-process implementations of every storage port, backed by `DashMap`.
//! Used by `backend.kind = "memory"` for local runs and by the HTTP tests.
//! Nothing survives a restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use ophir_core::error::Result;
use ophir_core::models::{
    Contact, ContactSubmission, Credential, Property, PropertyDraft, PropertyPatch, PropertyQuery,
    UploadedImage,
};
use ophir_core::traits::{ContactRepo, CredentialStore, MediaStore, PropertyRepo};
use tracing::debug;
use uuid::Uuid;

fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Default)]
pub struct MemoryContactRepo {
    rows: DashMap<String, Contact>,
    next_id: AtomicI64,
}

impl MemoryContactRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepo for MemoryContactRepo {
    async fn list_newest_first(&self) -> Result<Vec<Contact>> {
        let mut contacts: Vec<Contact> = self.rows.iter().map(|r| r.value().clone()).collect();
        // ids break ties between rows created in the same instant
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(contacts)
    }

    async fn insert(&self, submission: ContactSubmission) -> Result<Contact> {
        let contact = Contact {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            document_id: new_document_id(),
            full_name: submission.full_name,
            email: submission.email,
            country: submission.country,
            subject: submission.subject,
            message: submission.message,
            created_at: Utc::now(),
        };
        self.rows.insert(contact.document_id.clone(), contact.clone());
        Ok(contact)
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        if self.rows.remove(document_id).is_none() {
            debug!(document_id, "delete matched no contact");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPropertyRepo {
    rows: DashMap<String, Property>,
    next_id: AtomicI64,
}

impl MemoryPropertyRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyRepo for MemoryPropertyRepo {
    async fn list(&self, query: PropertyQuery) -> Result<Vec<Property>> {
        let mut properties: Vec<Property> = self
            .rows
            .iter()
            .map(|r| r.value().clone())
            .filter(|p| query.category.map_or(true, |c| p.category == c))
            .filter(|p| !query.visible_only || p.visible)
            .collect();
        properties.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(properties)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    async fn insert(&self, draft: PropertyDraft) -> Result<Property> {
        let property = Property {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            document_id: new_document_id(),
            property_id: draft.property_id,
            name: draft.name,
            location: draft.location,
            description: draft.description,
            rooms: draft.rooms,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            surface: draft.surface,
            surface_unit: draft.surface_unit,
            price: draft.price,
            property_type: draft.property_type,
            parking: draft.parking,
            category: draft.category,
            images: draft.images,
            visible: draft.visible,
            exclusive: draft.exclusive,
            visible_from: draft.visible_from,
            nearby_visits: draft.nearby_visits,
            views: draft.views,
            created_at: Utc::now(),
        };
        self.rows.insert(property.document_id.clone(), property.clone());
        Ok(property)
    }

    async fn update(&self, document_id: &str, patch: PropertyPatch) -> Result<Vec<Property>> {
        Ok(self
            .rows
            .get_mut(document_id)
            .map(|mut row| {
                patch.apply_to(row.value_mut());
                vec![row.value().clone()]
            })
            .unwrap_or_default())
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        if self.rows.remove(document_id).is_none() {
            debug!(document_id, "delete matched no property");
        }
        Ok(())
    }
}

/// Credentials keyed by email.
#[derive(Default)]
pub struct MemoryCredentialStore {
    by_email: DashMap<String, Credential>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        let by_email = DashMap::new();
        for credential in credentials {
            by_email.insert(credential.email.clone(), credential);
        }
        Self { by_email }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        Ok(self.by_email.get(email).map(|c| c.value().clone()))
    }
}

/// A stored object: content type and bytes.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Bytes,
}

pub struct MemoryMediaStore {
    objects: DashMap<String, StoredObject>,
    url_prefix: String,
}

impl MemoryMediaStore {
    /// `url_prefix` is prepended to filenames by `public_url`.
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn get(&self, filename: &str) -> Option<StoredObject> {
        self.objects.get(filename).map(|o| o.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn save_upload(&self, image: UploadedImage) -> Result<()> {
        self.objects.insert(
            image.filename,
            StoredObject {
                content_type: image.content_type,
                bytes: image.bytes,
            },
        );
        Ok(())
    }

    fn public_url(&self, filename: &str) -> String {
        if filename.starts_with("http") {
            return filename.to_string();
        }
        format!("{}/{}", self.url_prefix, filename)
    }
}
