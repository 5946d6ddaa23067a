//! Application builder: wires router, middleware and state into an Axum app,
//! and runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use erpgate_auth::{AllowList, AuthGateway, CredentialValidator, SessionCleanup, SessionStore};
use erpgate_core::config::AppConfig;
use erpgate_core::error::AppError;
use erpgate_odoo::{ErpConnector, OdooClient};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = build_cors_layer(&server.cors);
    let request_timeout = Duration::from_secs(server.request_timeout_seconds);

    build_router(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}

/// Assembles the shared state around an ERP connector.
pub fn build_state(config: Arc<AppConfig>, connector: Arc<dyn ErpConnector>) -> AppState {
    let allow_list = AllowList::from_config(&config.access);
    tracing::info!(allowed_users = allow_list.len(), "Allow-list loaded");

    let store = Arc::new(SessionStore::from_config(&config.session));
    let gateway = Arc::new(AuthGateway::new(
        CredentialValidator::new(Arc::new(allow_list)),
        &config.erp,
        connector,
        store,
    ));

    AppState::new(config, gateway)
}

/// Runs the erpgate server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let config = Arc::new(config);

    tracing::info!(
        endpoint = %config.erp.default_endpoint,
        database = %config.erp.default_database,
        endpoint_policy = %config.erp.endpoint_policy,
        "Starting erpgate server..."
    );

    let client = OdooClient::new(config.erp.call_timeout())?;
    let state = build_state(Arc::clone(&config), Arc::new(client));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let cleanup = SessionCleanup::new(
        Arc::clone(state.gateway.store()),
        config.session.cleanup_interval(),
    );
    let cleanup_handle = tokio::spawn(async move { cleanup.run(shutdown_rx).await });

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("erpgate server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, cleanup_handle).await.is_err() {
        tracing::warn!("Session cleanup did not stop within the grace period");
    }

    tracing::info!("erpgate server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
