use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use ophir_core::error::AppError;
use ophir_core::models::{stored_filename, UploadedImage};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::ApiResult;
use crate::session::AuthSession;
use crate::state::AppState;

/// Multipart part name the dashboard uses for listing images.
pub const IMAGES_FIELD: &str = "images";

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Declared part type when it parses, else a guess from the extension.
fn content_type_for(declared: Option<&str>, original: &str) -> String {
    declared
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .unwrap_or_else(|| mime_guess::from_path(original).first_or_octet_stream())
        .to_string()
}

/// `POST /api/upload`
///
/// Parts are stored one at a time, in order. The reply lists the stored
/// filenames and, in the same order, their public URLs. The first failure aborts the
/// request; objects already written stay in the bucket.
pub async fn upload(
    AuthSession(session): AuthSession,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    let mut multipart = multipart?;
    let mut filenames = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }

        let original = field.file_name().unwrap_or("upload").to_string();
        let content_type = content_type_for(field.content_type(), &original);
        let bytes = field.bytes().await?;
        let filename = stored_filename(state.clock.now_millis(), &original);

        state
            .media
            .save_upload(UploadedImage {
                filename: filename.clone(),
                content_type,
                bytes,
            })
            .await
            .inspect_err(|e| error!(%filename, stored = filenames.len(), "upload aborted: {e}"))?;

        filenames.push(filename);
    }

    if filenames.is_empty() {
        return Err(AppError::Validation("no images provided".into()).into());
    }

    let urls: Vec<String> = filenames.iter().map(|f| state.media.public_url(f)).collect();
    info!(count = filenames.len(), by = %session.email, "images uploaded");
    Ok(Json(json!({ "success": true, "filenames": filenames, "urls": urls })))
}
