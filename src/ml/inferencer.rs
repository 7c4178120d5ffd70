// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs a loaded pipeline on one encoded row.
//
// The pipeline is read-only after loading, so a single Inferencer
// is shared by every request thread. The artifact loader already
// refuses structurally inconsistent pipelines; any panic that still
// escapes inference is caught here and returned as
// `ModelError::InferencePanic`, and the caller keeps serving.

use std::panic::{self, AssertUnwindSafe};

use crate::domain::features::FeatureRow;
use crate::ml::error::ModelError;
use crate::ml::pipeline::SleepPipeline;

#[derive(Debug, Clone)]
pub struct Inferencer {
    pipeline: SleepPipeline,
}

impl Inferencer {
    pub fn new(pipeline: SleepPipeline) -> Self {
        Self { pipeline }
    }

    pub fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        // Nothing is mutated inside the closure, so no state can be
        // left half-updated by an unwind.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.predict(row)));

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Inference panicked: {}", message);
                Err(ModelError::InferencePanic(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
