//! Stride server - always-on backend for safety-aware route recommendations.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stride_server::api;
use stride_server::config::Config;
use stride_server::persistence;
use stride_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stride_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting Stride server...");

    let config = Config::from_env();
    let port = config.server_port;

    let db =
        persistence::init_database(&config.database_path, config.database_max_connections).await?;

    let store = persistence::SqliteIncidentStore::new(&db);
    match store.count().await {
        Ok(count) => tracing::info!("incident history loaded: {} records", count),
        Err(e) => tracing::warn!("could not count incident history: {e}"),
    }

    let state = Arc::new(AppState::from_config(config, db));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
