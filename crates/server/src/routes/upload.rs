use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{
    config::{Config, DEFAULT_BUCKET},
    error::{AppError, Result},
    services::{media, storage::StorageService},
    AppState,
};

pub fn protected_router(config: &Config) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
    )
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub bucket: String,
    pub content_type: String,
    pub size: usize,
}

struct IncomingFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file = None;
    let mut bucket = DEFAULT_BUCKET.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;

                // Browsers send an empty, unnamed part for an untouched file input
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }

                file = Some(IncomingFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "bucket" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read bucket: {e}")))?;
                if !value.trim().is_empty() {
                    bucket = value.trim().to_string();
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    StorageService::check_bucket(&bucket)?;

    let prepared = media::prepare(file.data, file.content_type.as_deref(), &file.file_name).await;
    let name = media::object_name(&prepared.extension);

    state
        .storage
        .put_object(&bucket, &name, &prepared.data)
        .await?;

    tracing::info!(
        bucket = %bucket,
        object = %name,
        size = prepared.data.len(),
        compressed = prepared.compressed,
        "stored upload"
    );

    Ok(Json(UploadResponse {
        url: state.storage.public_url(&bucket, &name),
        bucket,
        content_type: prepared.content_type,
        size: prepared.data.len(),
    }))
}
