//! Common test utilities for integration tests.
//!
//! Every test gets its own temporary directory holding the SQLite database
//! and the upload/output folders, so tests can run in parallel.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tender_hub_api::{
    app::create_app,
    config::{
        Config, DatabaseConfig, LoggingConfig, MatchingConfig, SecurityConfig, ServerConfig,
        StorageConfig,
    },
};
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "tender-hub-test-boundary";

/// Text that the demo engine matches to a pump and a valve.
pub const PUMP_AND_VALVE_TENDER: &str =
    "Supply and installation of one centrifugal pump with two control valves.";

/// A running test application and the resources backing it.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub config: Config,
    // Dropped last; removes the database and storage directories.
    pub dir: TempDir,
}

/// Test configuration rooted in `dir`.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            max_upload_bytes: 1024 * 1024,
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("tender_hub.db").display()),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
        },
        storage: StorageConfig {
            upload_dir: dir.path().join("uploads"),
            output_dir: dir.path().join("output"),
        },
        matching: MatchingConfig::default(),
    }
}

/// Create a migrated database pool for `config`.
pub async fn create_test_pool(config: &Config) -> SqlitePool {
    let pool = persistence::db::create_pool(&(&config.database).into())
        .await
        .expect("Failed to open test database");
    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Build a fresh application with its own database and storage.
pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir);

    std::fs::create_dir_all(&config.storage.upload_dir).unwrap();
    std::fs::create_dir_all(&config.storage.output_dir).unwrap();

    let pool = create_test_pool(&config).await;
    let router = create_app(config.clone(), pool.clone());

    TestApp {
        router,
        pool,
        config,
        dir,
    }
}

/// Build a multipart upload request with a single file field.
pub fn upload_request(field: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/tenders/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

pub async fn response_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Upload `contents` and return the created task's JSON.
pub async fn upload_tender(app: &TestApp, filename: &str, contents: &str) -> serde_json::Value {
    let response = app
        .router
        .clone()
        .oneshot(upload_request("file", filename, contents.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    parse_response_body(response).await
}
