pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::user_auth::jwt_auth_middleware;
use state::AppState;

/// Build the HTTP router
///
/// | Route                      | Auth   |
/// |----------------------------|--------|
/// | `GET/POST /accounts`       | public |
/// | `GET /accounts/{id}/balance` | public |
/// | `POST /login`              | public |
/// | `GET/POST /transfers`      | bearer |
/// | `GET /health`              | public |
pub fn build_router(state: Arc<AppState>) -> Router {
    let transfer_routes = Router::new()
        .route(
            "/transfers",
            get(handlers::get_transfers).post(handlers::create_transfer),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route(
            "/accounts",
            get(handlers::get_accounts).post(handlers::create_account),
        )
        .route("/accounts/{id}/balance", get(handlers::get_balance))
        .route("/login", post(handlers::login))
        .route("/health", get(handlers::health_check))
        .merge(transfer_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// Start HTTP server, returns once a shutdown signal is received and
/// in-flight requests have drained.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        );
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
