use std::sync::Arc;

use anyhow::{Context, Result};
use domain::PlannerStore;
use event_planner_api::{
    app,
    config::{Config, StorageBackend},
    middleware,
};
use persistence::{MemoryStore, PgStore};
use tracing::{info, warn};

async fn open_store(config: &Config) -> Result<Arc<dyn PlannerStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config())
                .await
                .context("failed to connect to PostgreSQL")?;

            if config.database.run_migrations {
                info!("Running database migrations...");
                persistence::db::run_migrations(&pool).await?;
                info!("Migrations completed");
            }

            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!(
        backend = config.storage.backend.as_str(),
        "Starting Event Planner API v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = open_store(&config).await?;
    let addr = config.socket_addr()?;
    let app = app::create_app(config, store)?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
