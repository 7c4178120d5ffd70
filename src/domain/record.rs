// ============================================================
// Layer 3 — RawRecord Domain Type
// ============================================================
// A flat, loosely typed mapping of attribute name → value.
//
// Two sources build RawRecords:
//   - the CSV loader: every cell arrives as text
//   - the HTTP body:  numbers arrive as numbers, strings as text
//
// Nothing is validated here. Validation and conversion happen in
// `encoding::encode_record`, the only code allowed to interpret
// field values, so both sources are held to the same rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::EncodeError;

/// One attribute value as it arrived from the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// A single person's unvalidated health / lifestyle snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for fixtures
    #[cfg(test)]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Build a record from a decoded JSON body.
    ///
    /// `null` values are dropped so they surface later as missing
    /// fields. Booleans, arrays and nested objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, EncodeError> {
        let object = value.as_object().ok_or(EncodeError::NotAnObject)?;
        let mut record = RawRecord::new();

        for (name, v) in object {
            match v {
                serde_json::Value::Null => continue,
                serde_json::Value::Number(n) => {
                    let n = n.as_f64().ok_or_else(|| EncodeError::UnsupportedValue {
                        field: name.clone(),
                        value: n.to_string(),
                    })?;
                    record.insert(name.as_str(), n);
                }
                serde_json::Value::String(s) => record.insert(name.as_str(), s.as_str()),
                other => {
                    return Err(EncodeError::UnsupportedValue {
                        field: name.clone(),
                        value: other.to_string(),
                    })
                }
            }
        }

        Ok(record)
    }
}
