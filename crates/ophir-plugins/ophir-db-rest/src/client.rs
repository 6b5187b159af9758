//! Thin client for the hosted backend's auto-generated REST interface.
//!
//! Every call carries the service key twice (`apikey` and bearer
//! `Authorization`), asks for JSON, and disables caching. Calls are made
//! once; retrying is left to the browser.

use ophir_core::error::AppError;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RestError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend answered {status} for {path}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected payload from {path}: {reason}")]
    Payload { path: String, reason: String },
}

impl From<RestError> for AppError {
    fn from(err: RestError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// Outcome of one backend call. Non-2xx answers are not errors at this
/// level; `ok` tells the caller what happened.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub ok: bool,
    pub status: StatusCode,
    /// Parsed body; `Null` when empty, a JSON string when not JSON.
    pub json: Value,
}

impl RestResponse {
    /// Turns a non-2xx answer into `RestError::Status`.
    pub fn into_json(self, path: &str) -> Result<Value, RestError> {
        if self.ok {
            Ok(self.json)
        } else {
            Err(RestError::Status {
                path: path.to_string(),
                status: self.status,
                body: self.json.to_string(),
            })
        }
    }
}

pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    service_key: SecretString,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, service_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Issues `method` against `{base}/rest/v1/{path}?{query}`.
    pub async fn call(
        &self,
        path: &str,
        query: &[(&str, &str)],
        method: Method,
        body: Option<&Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let url = format!("{}/rest/v1/{}", self.base_url, path);
        let key = self.service_key.expose_secret();

        let mut request = self
            .http
            .request(method.clone(), &url)
            .query(query)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-store");

        if method == Method::POST {
            request = request.header("Prefer", "return=representation");
        }
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "calling backend");

        let transport = |source| RestError::Transport {
            path: path.to_string(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        let json = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            warn!(%method, path, %status, "backend call failed");
        }

        Ok(RestResponse {
            ok: status.is_success(),
            status,
            json,
        })
    }

    /// `call`, require 2xx, then deserialize the body.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        method: Method,
        body: Option<&Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<T, RestError> {
        let json = self
            .call(path, query, method, body, extra_headers)
            .await?
            .into_json(path)?;

        serde_json::from_value(json).map_err(|e| RestError::Payload {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// `call` and require 2xx, ignoring the body.
    pub async fn execute(
        &self,
        path: &str,
        query: &[(&str, &str)],
        method: Method,
    ) -> Result<(), RestError> {
        self.call(path, query, method, None, &[])
            .await?
            .into_json(path)
            .map(|_| ())
    }
}
