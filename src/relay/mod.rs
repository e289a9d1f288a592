//! HTTP relay between the browser dashboard and the hosted model.
//!
//! The relay adds no business logic beyond validating the form, forwarding it
//! to the model and reshaping the answer; scenarios are kept in memory for the
//! lifetime of the process.

pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::ModelApi;
use crate::config::RelayConfig;
use crate::error::AppError;

pub use error::{ApiError, ApiResult};
pub use state::RelayState;

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/financial-model", post(handlers::run_financial_model))
        .route("/api/scenarios/predefined", get(handlers::predefined))
        .route("/api/scenarios/run-demo", post(handlers::run_demo))
        .route("/api/test-connectivity", get(handlers::test_connectivity))
        .route(
            "/api/scenarios",
            get(handlers::list_scenarios).post(handlers::save_scenario),
        )
        .route("/api/scenarios/export", get(handlers::export_scenarios))
        .route("/api/scenarios/import", post(handlers::import_scenarios))
        .route("/api/scenarios/compare", get(handlers::compare_scenarios))
        .route(
            "/api/scenarios/:id",
            get(handlers::get_scenario).delete(handlers::delete_scenario),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the relay until Ctrl-C.
///
/// The caller keeps its own handle on `api` so a blocking HTTP client is
/// dropped outside the runtime.
pub fn serve(config: &RelayConfig, api: Arc<dyn ModelApi>) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to start async runtime: {e}")))?;

    let addr = config.bind_addr();
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::input(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!(addr = %addr, "relay listening");

        axum::serve(listener, router(RelayState::new(api)))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::runtime(format!("Relay server error: {e}")))
    })?;

    tracing::info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
