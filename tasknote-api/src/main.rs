//! TaskNote API Server Entry Point
//!
//! Bootstraps configuration, waits for the database and starts the Axum
//! HTTP server.

use std::sync::Arc;

use axum::Router;
use tasknote_api::telemetry::{init_tracing, TelemetryConfig};
use tasknote_api::{create_api_router, ApiConfig, ApiError, ApiResult, DbClient, DbConfig};
use tasknote_storage::TaskNoteStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;
    db.wait_until_ready().await?;

    // Schema changes are applied by tasknote-migrate, never by the server.
    match db.pending_migrations().await {
        Ok(pending) if !pending.is_empty() => tracing::warn!(
            ?pending,
            "Database schema is behind; run tasknote-migrate"
        ),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not read migration status"),
    }

    let api_config = ApiConfig::from_env();
    let store: Arc<dyn TaskNoteStore> = Arc::new(db);
    let app: Router = create_api_router(store, &api_config);

    let addr = api_config.socket_addr()?;
    tracing::info!(%addr, "Starting TaskNote API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
