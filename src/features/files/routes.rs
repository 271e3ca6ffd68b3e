use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    clear_files, delete_file, list_files, serve_file, upload_file,
};
use crate::features::files::services::FileService;
use crate::shared::constants::MULTIPART_OVERHEAD_BYTES;

/// Create routes for the files feature
///
/// `/upload` and `/clear` only claim `POST`; `GET` and `DELETE` on them reach
/// the stored files of the same name.
pub fn routes(file_service: Arc<FileService>, max_upload_size: usize) -> Router {
    Router::new()
        .route("/", get(list_files))
        .route(
            "/upload",
            // Allow body size up to the upload limit + buffer for multipart overhead
            post(upload_file)
                .layer(DefaultBodyLimit::max(
                    max_upload_size.saturating_add(MULTIPART_OVERHEAD_BYTES),
                ))
                .get(serve_file)
                .delete(delete_file),
        )
        .route(
            "/clear",
            post(clear_files).get(serve_file).delete(delete_file),
        )
        .route("/{name}", get(serve_file).delete(delete_file))
        .with_state(file_service)
}
