// ============================================================
// Layer 7 — HTTP Handlers
// ============================================================
// Thin adapters between axum and the PredictorService. Every
// failure becomes a JSON `{"error": ...}` body:
//
//   ModelUnavailable                          → 500
//   MalformedBody / InvalidInput / Processing → 400
//
// `/predict` takes the raw body bytes rather than axum's `Json`
// extractor so that a bad body still gets a JSON error and so a
// degraded service answers 500 before the body is looked at.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::{ErrorResponse, HealthResponse, PredictionResponse};
use super::AppState;
use crate::application::predict_use_case::PredictError;
use crate::domain::encoding::ENCODING_VERSION;

pub const ROOT_MESSAGE: &str = "Sleep Quality Prediction API is running!";

/// GET / — liveness
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// GET /health — model status
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let predictor = &state.predictor;
    Json(HealthResponse {
        status:           predictor.status().to_string(),
        encoding_version: ENCODING_VERSION,
        model:            predictor.metadata().cloned(),
        reason:           predictor.reason().map(str::to_string),
    })
}

/// POST /predict — score one record
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    match state.predictor.predict_json(&body) {
        Ok(prediction) => Json(PredictionResponse { prediction }).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: PredictError) -> Response {
    let status = match err {
        PredictError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        PredictError::MalformedBody(_)
        | PredictError::InvalidInput(_)
        | PredictError::Processing(_) => StatusCode::BAD_REQUEST,
    };

    if status.is_server_error() {
        tracing::error!("Prediction refused: {}", err);
    } else {
        tracing::debug!("Rejected prediction request: {}", err);
    }

    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}
