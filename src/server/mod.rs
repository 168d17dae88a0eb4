//! The rate server: one `GET /cotacao` endpoint over axum.

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::config::ServerConfig;
use crate::core::rate::RateProvider;
use crate::core::record::RateStore;
use crate::providers::AwesomeApiProvider;
use crate::store::sqlite::SqliteStore;

/// Collaborators handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn RateProvider>,
    pub store: Arc<dyn RateStore>,
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn RateStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            store_timeout,
        }
    }

    /// Opens the sqlite store, creates the table if needed and builds the
    /// upstream provider.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let store = SqliteStore::open(Path::new(&config.database_path))
            .with_context(|| format!("Error connecting to database {}", config.database_path))?;
        store.bootstrap().context("Error creating table")?;

        let provider = AwesomeApiProvider::new(
            &config.upstream_url,
            &config.quote_key,
            config.upstream_timeout(),
        )
        .context("Error creating upstream client")?;

        Ok(Self::new(
            Arc::new(provider),
            Arc::new(store),
            config.store_timeout(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cotacao", get(handlers::get_cotacao))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

pub async fn run(config: &ServerConfig) -> Result<()> {
    let state = AppState::from_config(config)?;

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Server started at {}", listener.local_addr()?);

    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server");
}
