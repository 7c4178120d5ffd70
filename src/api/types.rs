//! Request / response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use crate::infra::artifact::ArtifactMetadata;

/// Successful `/predict` response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted Quality of Sleep score
    pub prediction: f64,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// `/health` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ready", "degraded" or "unloaded"
    pub status:           String,
    /// Version of the feature encoding this build speaks
    pub encoding_version: u32,
    /// Training metadata of the loaded artifact
    pub model:            Option<ArtifactMetadata>,
    /// Why no model is loaded, when it isn't
    pub reason:           Option<String>,
}
