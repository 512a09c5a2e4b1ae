//! HTTP handlers for the `/file` resource.
//!
//! Each handler calls one `FileService` operation and renders a flat JSON map.
//! Handlers that act on an existing object (`presigned-url`, `download`,
//! `delete`, `url`) first check existence and answer 404 when the object is
//! absent. The check and the follow-up call are not atomic: an object deleted
//! in between surfaces as a 500 from the follow-up call.

use crate::{
    errors::AppError,
    models::object::NewObject,
    services::file_service::{FileError, FileService},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::{Deserialize, Serialize};

const UPLOAD_FIELD: &str = "file";

/// `?objectName=` query accepted by most file endpoints.
#[derive(Debug, Deserialize)]
pub struct ObjectQuery {
    #[serde(rename = "objectName")]
    pub object_name: String,
}

/// `?objectName=&expiry=` for presigned URLs; `expiry` is in hours.
#[derive(Debug, Deserialize)]
pub struct PresignedUrlQuery {
    #[serde(rename = "objectName")]
    pub object_name: String,
    #[serde(default = "default_expiry_hours")]
    pub expiry: u32,
}

fn default_expiry_hours() -> u32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
    pub filename: Option<String>,
    pub size: usize,
    pub object_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlResponse {
    pub success: bool,
    pub presigned_url: String,
    pub expiry: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsResponse {
    pub exists: bool,
    pub object_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub success: bool,
    pub url: String,
    pub object_name: String,
}

/// `POST /file/upload`: multipart form with a `file` field.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    let filename = upload.original_name.clone();
    let size = upload.size();

    let object_name = state
        .files
        .upload(upload)
        .await
        .map_err(|err| AppError::from(err).during("file upload failed"))?;
    let url = state.files.url(&object_name).await;

    tracing::info!("uploaded {:?} as {} ({} bytes)", filename, object_name, size);

    Ok(Json(UploadResponse {
        success: true,
        message: "file uploaded successfully".into(),
        url,
        filename,
        size,
        object_name,
    }))
}

/// `GET /file/presigned-url?objectName=&expiry=`
pub async fn presigned_url(
    State(state): State<AppState>,
    Query(q): Query<PresignedUrlQuery>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    ensure_exists(&state.files, &q.object_name).await?;

    let presigned_url = state
        .files
        .presigned_url(&q.object_name, q.expiry)
        .await
        .map_err(|err| AppError::from(err).during("failed to create presigned url"))?;

    Ok(Json(PresignedUrlResponse {
        success: true,
        presigned_url,
        expiry: format!("{}h", q.expiry),
    }))
}

/// `GET /file/download?objectName=`: streams the object as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    Query(q): Query<ObjectQuery>,
) -> Result<Response, AppError> {
    ensure_exists(&state.files, &q.object_name).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        q.object_name
    ))
    .map_err(|err| AppError::internal(format!("file download failed: {}", err)))?;

    let stream = state
        .files
        .stream(&q.object_name)
        .await
        .map_err(|err| AppError::from(err).during("file download failed"))?;

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// `DELETE /file/delete?objectName=`
pub async fn delete_file(
    State(state): State<AppState>,
    Query(q): Query<ObjectQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    ensure_exists(&state.files, &q.object_name).await?;

    state
        .files
        .delete(&q.object_name)
        .await
        .map_err(|err| AppError::from(err).during("file delete failed"))?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "file deleted successfully".into(),
    }))
}

/// `GET /file/exists?objectName=`: never fails; store faults read as `false`.
pub async fn file_exists(
    State(state): State<AppState>,
    Query(q): Query<ObjectQuery>,
) -> Json<ExistsResponse> {
    let exists = state.files.exists(&q.object_name).await;
    Json(ExistsResponse {
        exists,
        object_name: q.object_name,
    })
}

/// `GET /file/url?objectName=`: signed URL, or the direct URL if signing fails.
pub async fn file_url(
    State(state): State<AppState>,
    Query(q): Query<ObjectQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    ensure_exists(&state.files, &q.object_name).await?;

    let url = state.files.url(&q.object_name).await;
    Ok(Json(UrlResponse {
        success: true,
        url,
        object_name: q.object_name,
    }))
}

async fn ensure_exists(files: &FileService, object_name: &str) -> Result<(), AppError> {
    if files.exists(object_name).await {
        Ok(())
    } else {
        Err(FileError::NotFound(object_name.to_string()).into())
    }
}

/// Pull the `file` field out of the form; other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> Result<NewObject, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::new(err.status(), err.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let content = field
            .bytes()
            .await
            .map_err(|err| AppError::new(err.status(), err.body_text()))?;

        return Ok(NewObject {
            content,
            content_type,
            original_name,
        });
    }

    Err(AppError::bad_request("missing multipart field `file`"))
}
