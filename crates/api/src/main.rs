use anyhow::{Context, Result};
use tracing::info;

use tender_hub_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Tender Hub API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        engine = %config.matching.engine,
        catalog = config.matching.catalog_hint.as_deref().unwrap_or("built-in"),
        upload_dir = %config.storage.upload_dir.display(),
        output_dir = %config.storage.output_dir.display(),
        "Matching and storage configured"
    );

    for dir in [&config.storage.upload_dir, &config.storage.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
