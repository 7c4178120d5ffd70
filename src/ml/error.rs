use thiserror::Error;

/// Failures while fitting or running the regression pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("{rows} feature rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("expected {expected} input columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("invalid forest configuration: {0}")]
    InvalidConfig(String),

    #[error("artifact uses encoding version {found}, this build speaks {expected}")]
    IncompatibleEncoding { expected: u32, found: u32 },

    #[error("artifact feature columns {found:?} differ from {expected:?}")]
    ColumnMismatch { expected: Vec<String>, found: Vec<String> },

    #[error("artifact model is inconsistent: {0}")]
    CorruptModel(String),

    #[error("model produced a non-finite prediction ({0})")]
    NonFinitePrediction(f64),

    #[error("inference panicked: {0}")]
    InferencePanic(String),
}
