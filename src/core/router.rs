use axum::{http::Uri, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::files::{routes as files_routes, FileService};
use crate::shared::types::ApiResponse;

/// Swagger UI location; multi-segment so it never shadows a stored file
pub const SWAGGER_UI_PATH: &str = "/_docs/swagger-ui";
pub const OPENAPI_JSON_PATH: &str = "/_docs/openapi.json";
pub const HEALTH_PATH: &str = "/_status/health";

async fn health_check() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success(None, Some("OK".to_string())))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No resource at {}", uri.path()))
}

/// Assemble the application router with docs, health check and HTTP layers
pub fn build_router(config: &Config, file_service: Arc<FileService>) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = Router::new().merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, openapi));
    let health_route = Router::new().route(HEALTH_PATH, get(health_check));

    Router::new()
        .merge(swagger)
        .merge(health_route)
        .merge(files_routes(file_service, config.app.max_upload_size))
        .fallback(not_found)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::shared::test_helpers::create_test_server;

    #[tokio::test]
    async fn test_health_check() {
        let (server, _dir) = create_test_server().await;

        let response = server.get(HEALTH_PATH).await;
        response.assert_status_ok();
        let body: ApiResponse<()> = response.json();
        assert!(body.success);
    }

    #[tokio::test]
    async fn test_openapi_document_uses_configured_info() {
        let (server, _dir) = create_test_server().await;

        let response = server.get(OPENAPI_JSON_PATH).await;
        response.assert_status_ok();
        let doc: serde_json::Value = response.json();
        assert_eq!(doc["info"]["version"], "0.0.0-test");
        assert!(doc["paths"].get("/upload").is_some());
    }

    #[tokio::test]
    async fn test_unknown_nested_path_is_json_not_found() {
        let (server, _dir) = create_test_server().await;

        let response = server.get("/nested/path/file.txt").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ApiResponse<()> = response.json();
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let (server, _dir) = create_test_server().await;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.maybe_header("x-request-id").is_some());
    }
}
