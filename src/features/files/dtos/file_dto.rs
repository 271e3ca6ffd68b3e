use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload; stored under its original filename
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Names of every file currently in the store
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListDto {
    /// Entry names in directory enumeration order
    pub files: Vec<String>,
}

/// Outcome of a completed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFileDto {
    pub name: String,
    pub size: u64,
}

/// Plain-text body returned after a successful upload
pub const UPLOAD_CONFIRMATION: &str = "File uploaded!";
