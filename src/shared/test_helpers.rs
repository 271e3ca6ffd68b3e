use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;

use crate::core::config::{AppConfig, Config, StorageConfig, SwaggerConfig};
use crate::core::router::build_router;
use crate::features::files::FileService;
use crate::modules::storage::LocalStore;

/// Upload limit used by test servers
pub const TEST_MAX_UPLOAD_SIZE: usize = 64 * 1024;

pub fn create_test_config(root: &std::path::Path) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            max_upload_size: TEST_MAX_UPLOAD_SIZE,
        },
        storage: StorageConfig {
            root: root.to_path_buf(),
        },
        swagger: SwaggerConfig {
            title: "File Store API".to_string(),
            version: "0.0.0-test".to_string(),
            description: "Test instance".to_string(),
        },
    }
}

/// Full application router over a fresh temporary store root.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn create_test_server() -> (TestServer, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir.path().join("files"));

    let store = LocalStore::open(&config.storage.root).await.unwrap();
    let file_service = Arc::new(FileService::new(
        Arc::new(store),
        config.app.max_upload_size,
    ));

    let server = TestServer::new(build_router(&config, file_service)).unwrap();
    (server, dir)
}
