// ============================================================
// Layer 3 — Encoding Errors
// ============================================================
// Every variant here is a client-input error: the caller sent a
// record we cannot turn into a feature row. The HTTP layer maps
// all of them to 400, the trainer aborts with the row number.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("record must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be a number, got {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field '{field}' must be a string")]
    NotText { field: &'static str },

    #[error("field '{field}' has unsupported value {value}")]
    UnsupportedValue { field: String, value: String },

    #[error("invalid category '{value}' for field '{field}'")]
    UnknownCategory { field: &'static str, value: String },

    #[error("malformed blood pressure '{0}', expected 'systolic/diastolic'")]
    MalformedBloodPressure(String),
}

impl EncodeError {
    /// Name of the offending field, when the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            EncodeError::MissingField(f)
            | EncodeError::NotNumeric { field: f, .. }
            | EncodeError::NotText { field: f }
            | EncodeError::UnknownCategory { field: f, .. } => Some(*f),
            EncodeError::UnsupportedValue { field, .. } => Some(field.as_str()),
            EncodeError::MalformedBloodPressure(_) => Some(crate::domain::encoding::field::BLOOD_PRESSURE),
            EncodeError::NotAnObject => None,
        }
    }
}
