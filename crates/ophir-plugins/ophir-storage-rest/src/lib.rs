//! # ophir-storage-rest
//!
//! `MediaStore` backed by the hosted object store's HTTP interface.
//! Objects land at `{base}/storage/v1/object/{bucket}/{filename}` and are
//! served publicly from `{base}/storage/v1/object/public/{bucket}/{filename}`.

use async_trait::async_trait;
use ophir_core::error::{AppError, Result};
use ophir_core::models::UploadedImage;
use ophir_core::traits::MediaStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info};

pub struct RestMediaStore {
    http: reqwest::Client,
    base_url: String,
    service_key: SecretString,
    bucket: String,
}

impl RestMediaStore {
    pub fn new(base_url: impl Into<String>, service_key: SecretString, bucket: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, filename: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, filename)
    }
}

#[async_trait]
impl MediaStore for RestMediaStore {
    /// One POST per object, no retry.
    async fn save_upload(&self, image: UploadedImage) -> Result<()> {
        let key = self.service_key.expose_secret();
        let size = image.bytes.len();

        let response = self
            .http
            .post(self.object_url(&image.filename))
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .header(CONTENT_TYPE, image.content_type.as_str())
            .body(image.bytes)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("upload of {} failed: {e}", image.filename)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(filename = %image.filename, %status, %body, "object store rejected upload");
            return Err(AppError::Upstream(format!(
                "object store answered {status} for {}",
                image.filename
            )));
        }

        info!(filename = %image.filename, size, "stored image");
        Ok(())
    }

    fn public_url(&self, filename: &str) -> String {
        if filename.starts_with("http") {
            return filename.to_string();
        }
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, filename
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RestMediaStore {
        RestMediaStore::new("https://db.example/", "key".to_string().into(), "property-images")
    }

    #[test]
    fn public_urls_point_at_the_bucket() {
        assert_eq!(
            store().public_url("1700-villa.jpg"),
            "https://db.example/storage/v1/object/public/property-images/1700-villa.jpg"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let url = "https://cdn.example/villa.jpg";
        assert_eq!(store().public_url(url), url);
    }

    #[test]
    fn object_url_uses_the_upload_path() {
        assert_eq!(
            store().object_url("a.png"),
            "https://db.example/storage/v1/object/property-images/a.png"
        );
    }
}
