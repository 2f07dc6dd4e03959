use anyhow::Context;
use tracing::info;

use crate::config;
use crate::database::DatabaseManager;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Survey Exchange in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::initialize(&pool, config.database.seed_lookups)
        .await
        .context("failed to create schema")?;

    let bind_addr = match port {
        Some(port) => format!("{}:{}", config.server.bind_host, port),
        None => config.bind_addr(),
    };
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(AppState::new(pool)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
