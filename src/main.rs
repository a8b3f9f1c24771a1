// src/main.rs
mod config;
mod database;
mod dtos;
mod error;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, PORT_FALLBACK_RANGE};
use crate::store::{MemoryProductStore, PgProductStore, ProductStore};

#[tokio::main]
async fn main() {
    // Load environment variables first so RUST_LOG from .env applies
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let store = match connect_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize product store");
            return;
        }
    };

    // Create application state
    let app_state = state::AppState::new(store);

    let app = routes::create_router()
        .route("/", get(|| async { "Product API" }))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let Some(listener) = bind(&config).await else {
        return;
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}

async fn connect_store(config: &Config) -> Result<Arc<dyn ProductStore>, sqlx::Error> {
    match &config.database_url {
        Some(url) => {
            let pool = database::create_pool(url, config.max_connections).await?;
            database::ensure_schema(&pool).await?;
            tracing::info!(max_connections = config.max_connections, "Connected to Postgres");
            Ok(Arc::new(PgProductStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, products are kept in memory");
            Ok(Arc::new(MemoryProductStore::new()))
        }
    }
}

// Try PORT..=PORT+20 to avoid crash when address is in use
async fn bind(config: &Config) -> Option<TcpListener> {
    for offset in 0..=PORT_FALLBACK_RANGE {
        let port = config.port.saturating_add(offset);
        let addr = SocketAddr::from((config.host, port));
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!("Server running on {}", addr);
                return Some(listener);
            }
            Err(e) => {
                if offset == 0 {
                    tracing::warn!(%addr, error = %e, "Port in use, trying next");
                }
            }
        }
    }

    tracing::error!(
        "Failed to bind to any port starting at {} on {}",
        config.port,
        config.host
    );
    None
}

async fn health_check() -> &'static str {
    "OK"
}
