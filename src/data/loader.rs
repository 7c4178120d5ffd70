// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Loads the sleep health dataset export using the csv crate.
//
// Expected header (extra columns are carried but ignored):
//   Person ID, Gender, Age, Occupation, Sleep Duration,
//   Quality of Sleep, Physical Activity Level, Stress Level,
//   BMI Category, Blood Pressure, Heart Rate, Daily Steps,
//   Sleep Disorder [, Body Temperature]
//
// What happens per row:
//   1. Every cell becomes a FieldValue::Text (trimmed, empty cells
//      are left out so the encoder reports them as missing)
//   2. "Person ID" is dropped — it identifies, it doesn't predict
//   3. "Quality of Sleep" is pulled out as the regression target
//
// Body Temperature:
//   The public export has no such column but the model contract
//   has 13 features. When the whole column is absent every row is
//   filled with `default_body_temperature` and a single warning is
//   logged. A present column with an empty cell is NOT filled.
//
// Unlike the encoder, the loader fails the whole run on the first
// bad row: a training set with silently dropped rows is worse than
// no artifact at all.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::domain::encoding::field;
use crate::domain::record::{FieldValue, RawRecord};
use crate::domain::traits::{LabelledRecord, RecordSource};

/// Reads labelled records from a CSV file.
pub struct CsvLoader {
    path:                     PathBuf,
    default_body_temperature: f64,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>, default_body_temperature: f64) -> Self {
        Self {
            path: path.into(),
            default_body_temperature,
        }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<LabelledRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Cannot read CSV header of '{}'", self.path.display()))?
            .clone();

        if !headers.iter().any(|h| h == field::QUALITY_OF_SLEEP) {
            bail!(
                "Dataset '{}' has no '{}' column to train on",
                self.path.display(),
                field::QUALITY_OF_SLEEP
            );
        }

        let fill_body_temperature = !headers.iter().any(|h| h == field::BODY_TEMPERATURE);
        if fill_body_temperature {
            tracing::warn!(
                "Dataset has no '{}' column, filling every row with {}",
                field::BODY_TEMPERATURE,
                self.default_body_temperature
            );
        }

        let mut records = Vec::new();

        for (index, row) in reader.records().enumerate() {
            // Line 1 is the header
            let line = index + 2;
            let row  = row.with_context(|| format!("Malformed CSV at line {line}"))?;

            let mut record = RawRecord::new();
            for (name, cell) in headers.iter().zip(row.iter()) {
                if !cell.is_empty() {
                    record.insert(name, cell);
                }
            }

            record.remove(field::PERSON_ID);

            let target = match record.remove(field::QUALITY_OF_SLEEP) {
                Some(FieldValue::Text(s)) => s.parse::<f64>().with_context(|| {
                    format!("Line {line}: '{}' is not a number: '{s}'", field::QUALITY_OF_SLEEP)
                })?,
                Some(FieldValue::Number(n)) => n,
                None => bail!("Line {line}: missing '{}'", field::QUALITY_OF_SLEEP),
            };
            if !target.is_finite() {
                bail!("Line {line}: '{}' must be finite", field::QUALITY_OF_SLEEP);
            }

            if fill_body_temperature {
                record.insert(field::BODY_TEMPERATURE, self.default_body_temperature);
            }

            records.push(LabelledRecord { record, target });
        }

        tracing::info!(
            "Loaded {} records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
