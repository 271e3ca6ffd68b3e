use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        files_handlers::list_files,
        files_handlers::serve_file,
        files_handlers::upload_file,
        files_handlers::delete_file,
        files_handlers::clear_files,
    ),
    components(
        schemas(
            files_dtos::FileListDto,
            files_dtos::UploadFileDto,
        )
    ),
    tags(
        (name = "files", description = "Flat file store: upload, list, serve, delete and clear"),
    ),
    info(
        title = "File Store API",
        version = "0.1.0",
        description = "Upload, list, serve and delete files in a flat store",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
