use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Request, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::FileName;
use crate::features::files::dtos::{
    FileListDto, StoredFileDto, UploadFileDto, UPLOAD_CONFIRMATION,
};
use crate::features::files::services::FileService;
use crate::shared::constants::UPLOAD_FIELD_NAME;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// List stored files
#[utoipa::path(
    get,
    path = "/",
    tag = "files",
    responses(
        (status = 200, description = "Names of all stored files", body = FileListDto),
        (status = 500, description = "Store directory could not be read")
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<FileListDto>, AppError> {
    Ok(Json(service.list_files().await?))
}

/// Download a stored file
///
/// Content type is inferred from the file name. Conditional (`If-Modified-Since`)
/// and range (`Range`) requests are honoured.
#[utoipa::path(
    get,
    path = "/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 206, description = "Partial file contents"),
        (status = 304, description = "Not modified"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve_file(
    State(service): State<Arc<FileService>>,
    FileName(name): FileName,
    request: Request,
) -> Result<Response, AppError> {
    let path = service.resolve_file(&name).await?;

    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    Ok(response.map(Body::new))
}

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` field. The file is stored
/// under its original filename, replacing any existing file of that name.
/// Other fields are ignored.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 200, description = "File uploaded successfully", body = String, content_type = "text/plain"),
        (status = 400, description = "No file attached or invalid file name"),
        (status = 413, description = "File too large"),
        (status = 500, description = "File could not be written")
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, AppError> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected upload body: {}", e);
        AppError::BadRequest(format!("Expected a multipart/form-data body: {}", e.body_text()))
    })?;

    let mut stored: Option<StoredFileDto> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name != UPLOAD_FIELD_NAME {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }
        if stored.is_some() {
            debug!("Ignoring additional '{}' field", UPLOAD_FIELD_NAME);
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::BadRequest("Uploaded file has no filename".to_string()))?;

        stored = Some(
            service
                .store_file(&file_name, field.map_err(multipart_error))
                .await?,
        );
    }

    let stored = stored.ok_or_else(|| {
        AppError::BadRequest(format!(
            "No file was uploaded. Attach one under the '{}' form field",
            UPLOAD_FIELD_NAME
        ))
    })?;
    debug!("Upload complete: {} ({} bytes)", stored.name, stored.size);

    Ok(UPLOAD_CONFIRMATION)
}

/// Delete a stored file
#[utoipa::path(
    delete,
    path = "/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    FileName(name): FileName,
) -> Result<StatusCode, AppError> {
    service.delete_file(&name).await?;
    Ok(StatusCode::OK)
}

/// Delete every stored file
#[utoipa::path(
    post,
    path = "/clear",
    tag = "files",
    responses(
        (status = 200, description = "Store cleared"),
        (status = 500, description = "Store could not be cleared")
    )
)]
pub async fn clear_files(State(service): State<Arc<FileService>>) -> Result<StatusCode, AppError> {
    service.clear().await?;
    Ok(StatusCode::OK)
}
