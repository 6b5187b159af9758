//! # ophir-db-rest
//!
//! Port implementations that proxy every CRUD operation to the hosted
//! backend's REST interface. The backend owns the tables:
//!
//! - `contact_submissions`
//! - `properties`
//! - `admin_credentials`
//!
//! Nothing is cached and nothing is retried.

pub mod client;
pub mod rows;

use std::sync::Arc;

use async_trait::async_trait;
use ophir_core::error::{AppError, Result};
use ophir_core::models::{
    Contact, ContactSubmission, Credential, Property, PropertyDraft, PropertyPatch, PropertyQuery,
};
use ophir_core::traits::{ContactRepo, CredentialStore, PropertyRepo};
use reqwest::Method;
use serde_json::Value;
use tracing::info;

pub use client::{RestClient, RestError, RestResponse};
use rows::{ContactInsert, ContactRow, CredentialRow, PropertyRow};

const CONTACTS: &str = "contact_submissions";
const PROPERTIES: &str = "properties";
const CREDENTIALS: &str = "admin_credentials";

const NEWEST_FIRST: (&str, &str) = ("order", "created_at.desc");
const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

fn first_row<T>(mut rows: Vec<T>, table: &str) -> Result<T> {
    if rows.is_empty() {
        return Err(AppError::Upstream(format!(
            "{table}: backend returned no representation"
        )));
    }
    Ok(rows.swap_remove(0))
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

pub struct RestContactRepo {
    client: Arc<RestClient>,
}

impl RestContactRepo {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContactRepo for RestContactRepo {
    async fn list_newest_first(&self) -> Result<Vec<Contact>> {
        let rows: Vec<ContactRow> = self
            .client
            .fetch(CONTACTS, &[("select", "*"), NEWEST_FIRST], Method::GET, None, &[])
            .await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn insert(&self, submission: ContactSubmission) -> Result<Contact> {
        let body = serde_json::to_value(ContactInsert::from(&submission))
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let rows: Vec<ContactRow> = self
            .client
            .fetch(CONTACTS, &[], Method::POST, Some(&body), &[])
            .await?;
        let contact = Contact::from(first_row(rows, CONTACTS)?);
        info!(document_id = %contact.document_id, "stored contact submission");
        Ok(contact)
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        let filter = eq(document_id);
        self.client
            .execute(CONTACTS, &[("document_id", filter.as_str())], Method::DELETE)
            .await?;
        Ok(())
    }
}

pub struct RestPropertyRepo {
    client: Arc<RestClient>,
}

impl RestPropertyRepo {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PropertyRepo for RestPropertyRepo {
    async fn list(&self, query: PropertyQuery) -> Result<Vec<Property>> {
        let category = query.category.map(|c| eq(c.as_str()));
        let mut params = vec![("select", "*"), NEWEST_FIRST];
        if let Some(category) = &category {
            params.push(("category", category.as_str()));
        }
        if query.visible_only {
            params.push(("visible", "eq.true"));
        }

        let found: Vec<PropertyRow> = self
            .client
            .fetch(PROPERTIES, &params, Method::GET, None, &[])
            .await?;
        rows::map_properties(found)
    }

    async fn count(&self) -> Result<u64> {
        let ids: Vec<Value> = self
            .client
            .fetch(PROPERTIES, &[("select", "id")], Method::GET, None, &[])
            .await?;
        Ok(ids.len() as u64)
    }

    async fn insert(&self, draft: PropertyDraft) -> Result<Property> {
        let body = rows::insert_body(&draft);
        let found: Vec<PropertyRow> = self
            .client
            .fetch(PROPERTIES, &[], Method::POST, Some(&body), &[])
            .await?;
        Property::try_from(first_row(found, PROPERTIES)?)
    }

    async fn update(&self, document_id: &str, patch: PropertyPatch) -> Result<Vec<Property>> {
        let filter = eq(document_id);
        let body = rows::patch_body(&patch);
        let found: Vec<PropertyRow> = self
            .client
            .fetch(
                PROPERTIES,
                &[("document_id", filter.as_str())],
                Method::PATCH,
                Some(&body),
                &[RETURN_REPRESENTATION],
            )
            .await?;
        rows::map_properties(found)
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        let filter = eq(document_id);
        self.client
            .execute(PROPERTIES, &[("document_id", filter.as_str())], Method::DELETE)
            .await?;
        Ok(())
    }
}

pub struct RestCredentialStore {
    client: Arc<RestClient>,
}

impl RestCredentialStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialStore for RestCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let filter = eq(email);
        let rows: Vec<CredentialRow> = self
            .client
            .fetch(
                CREDENTIALS,
                &[
                    ("select", "email,password,role"),
                    ("email", filter.as_str()),
                    ("limit", "1"),
                ],
                Method::GET,
                None,
                &[],
            )
            .await?;

        rows.into_iter().next().map(Credential::try_from).transpose()
    }
}
