use std::sync::Arc;

use anyhow::Context;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jornada_api::config::{self, StoreBackend};
use jornada_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use jornada_api::storage::LocalObjectStore;
use jornada_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    info!("Starting Jornada API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            if jornada_api::is_production!() {
                warn!("Running production on the in-memory store; data is lost on restart");
            } else {
                info!("Using the in-memory store; data is lost on restart");
            }
            Arc::new(MemoryStore::new())
        }
    };

    let objects = Arc::new(LocalObjectStore::from_config(&config.storage));
    let state = AppState::new(store, objects, config.clone());

    let app = jornada_api::app(state)
        .nest_service("/files", ServeDir::new(&config.storage.root_dir));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Jornada API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
