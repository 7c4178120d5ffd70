// ============================================================
// Layer 2 — Predictor Service
// ============================================================
// Owns the loaded pipeline and answers single-record predictions.
//
// State machine:
//
//   Unloaded ──load()──► Ready     (artifact read and verified)
//                   └──► Degraded  (artifact missing or rejected)
//
// The service is built once at startup, wrapped in an Arc and
// shared by every request. It is never mutated after `load()`, so
// concurrent requests need no locking.
//
// Request flow for `predict_json`:
//
//   1. State check         Unloaded / Degraded → ModelUnavailable
//   2. Parse JSON body     not JSON            → MalformedBody
//   3. Encode the record   bad / missing field → InvalidInput
//   4. Run the pipeline    anything else       → Processing
//
// The state check comes first: a degraded service answers every
// prediction request the same way, whatever the body looks like.

use thiserror::Error;

use crate::domain::encoding::encode_record;
use crate::domain::error::EncodeError;
use crate::domain::record::RawRecord;
use crate::domain::traits::SleepScorer;
use crate::infra::artifact::{ArtifactMetadata, ArtifactStore};
use crate::ml::error::ModelError;
use crate::ml::inferencer::Inferencer;
use crate::ml::pipeline::SleepPipeline;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("ML model not loaded on server")]
    ModelUnavailable,

    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    InvalidInput(#[from] EncodeError),

    #[error("ML processing failed: {0}")]
    Processing(#[from] ModelError),
}

/// Where the service is in its lifecycle
#[derive(Debug)]
pub enum ModelState {
    Unloaded,
    Ready {
        inferencer: Inferencer,
        metadata:   ArtifactMetadata,
    },
    Degraded {
        reason: String,
    },
}

pub struct PredictorService {
    store: Option<ArtifactStore>,
    state: ModelState,
}

impl PredictorService {
    /// A service that has not tried to load its artifact yet
    pub fn new(store: ArtifactStore) -> Self {
        Self { store: Some(store), state: ModelState::Unloaded }
    }

    /// A Ready service around an in-memory pipeline
    #[cfg(test)]
    pub fn from_pipeline(pipeline: SleepPipeline, metadata: ArtifactMetadata) -> Self {
        Self {
            store: None,
            state: ModelState::Ready { inferencer: Inferencer::new(pipeline), metadata },
        }
    }

    /// Attempt to read the artifact. Never fails: an unusable
    /// artifact leaves the service Degraded with the reason kept.
    pub fn load(self) -> Self {
        let Some(store) = self.store else {
            return self;
        };

        let state = match store.load() {
            Ok(artifact) => {
                tracing::info!(
                    "Model loaded from '{}' ({} trees, R²={})",
                    store.path().display(),
                    artifact.metadata.n_trees,
                    artifact
                        .metadata
                        .r2
                        .map(|r| format!("{r:.4}"))
                        .unwrap_or_else(|| "n/a".to_string()),
                );
                ModelState::Ready {
                    inferencer: Inferencer::new(artifact.pipeline),
                    metadata:   artifact.metadata,
                }
            }
            Err(e) => {
                tracing::warn!("Serving without a model: {}", e);
                ModelState::Degraded { reason: e.to_string() }
            }
        };

        Self { store: Some(store), state }
    }

    pub fn status(&self) -> &'static str {
        match self.state {
            ModelState::Unloaded        => "unloaded",
            ModelState::Ready { .. }    => "ready",
            ModelState::Degraded { .. } => "degraded",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    pub fn metadata(&self) -> Option<&ArtifactMetadata> {
        match &self.state {
            ModelState::Ready { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    /// Why the service is not Ready, if it isn't
    pub fn reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Degraded { reason } => Some(reason),
            ModelState::Unloaded => Some("model has not been loaded"),
            ModelState::Ready { .. } => None,
        }
    }

    fn inferencer(&self) -> Result<&Inferencer, PredictError> {
        match &self.state {
            ModelState::Ready { inferencer, .. } => Ok(inferencer),
            _ => Err(PredictError::ModelUnavailable),
        }
    }

    pub fn predict_record(&self, record: &RawRecord) -> Result<f64, PredictError> {
        let inferencer = self.inferencer()?;
        let row        = encode_record(record)?;
        Ok(inferencer.predict(&row)?)
    }

    /// Score a raw request body.
    pub fn predict_json(&self, body: &[u8]) -> Result<f64, PredictError> {
        let inferencer = self.inferencer()?;

        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| PredictError::MalformedBody(e.to_string()))?;
        let record = RawRecord::from_json(&value)?;
        let row    = encode_record(&record)?;

        Ok(inferencer.predict(&row)?)
    }
}

impl SleepScorer for PredictorService {
    type Error = PredictError;

    fn score(&self, record: &RawRecord) -> Result<f64, PredictError> {
        self.predict_record(record)
    }
}
