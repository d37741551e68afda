use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::TaskService;
use persistence::repositories::{AuditLogRepository, TaskRepository};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, security_headers_middleware, trace_id};
use crate::routes::{export, health, tasks, tenders};
use crate::services::{DemoMatchingEngine, FileProposalRenderer};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub tasks: Arc<TaskService>,
}

/// Wires the task service to its SQLite, matching and rendering backends.
pub fn build_task_service(config: &Config, pool: &SqlitePool) -> TaskService {
    let repository = Arc::new(TaskRepository::new(pool.clone()));

    TaskService::new(
        repository,
        Arc::new(AuditLogRepository::new(pool.clone())),
        Arc::new(DemoMatchingEngine::new()),
        Arc::new(FileProposalRenderer::new(&config.storage.output_dir)),
        &config.storage.upload_dir,
    )
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(config: Config, pool: SqlitePool) -> Router {
    let config = Arc::new(config);
    let tasks = Arc::new(build_task_service(&config, &pool));

    let state = AppState {
        pool,
        config: config.clone(),
        tasks,
    };

    let task_routes = Router::new()
        .route("/tenders/upload", post(tenders::upload_tender))
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks/:task_id", get(tasks::get_task))
        .route("/tasks/:task_id/validate", post(tasks::validate_match))
        .route(
            "/tasks/:task_id/generate-proposal",
            post(tasks::generate_proposal),
        )
        .route("/tasks/:task_id/audit", get(tasks::list_audit_entries))
        .route(
            "/export/download/:filename",
            get(export::download_artifact),
        );

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/api/version", get(health::version))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
