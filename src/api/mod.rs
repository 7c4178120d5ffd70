// ============================================================
// Layer 7 — HTTP API
// ============================================================
// The predictor service behind axum.
//
//   GET  /         → liveness string
//   GET  /health   → model status JSON
//   POST /predict  → {"prediction": <float>} or {"error": ...}
//
// Cross-origin requests are allowed from any origin with any
// method and header. Requests are traced with tower-http's
// TraceLayer. Ctrl-C stops accepting connections and lets
// in-flight requests finish.
//
// Reference: axum / tower-http documentation

pub mod handlers;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::application::predict_use_case::PredictorService;

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictorService>,
}

pub fn create_router(predictor: Arc<PredictorService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { predictor })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, predictor: Arc<PredictorService>) -> Result<()> {
    let status   = predictor.status();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;

    tracing::info!("Listening on http://{} (model {})", listener.local_addr()?, status);

    axum::serve(listener, create_router(predictor))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
