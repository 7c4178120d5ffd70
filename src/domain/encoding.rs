// ============================================================
// Layer 3 — Shared Feature Encoder
// ============================================================
// The one place that knows how a raw record becomes a FeatureRow.
//
// Used by:
//   - TrainUseCase     → encode_batch over every CSV row
//   - PredictorService → encode_record on one JSON body
//
// Mappings:
//   BMI Category    Normal=1, Normal Weight=1, Overweight=2, Obese=3
//   Sleep Disorder  None=0, Sleep Apnea=1, Insomnia=2
//   Blood Pressure  "S/D" → Systolic_BP=S, Diastolic_BP=D
//
// "Normal" and "Normal Weight" share rank 1. Trained artifacts
// depend on that collapse, so it must stay.
//
// Bump ENCODING_VERSION whenever any mapping or the column order
// changes; artifacts carry the version they were trained with and
// the loader rejects a mismatch.

use thiserror::Error;

use crate::domain::error::EncodeError;
use crate::domain::features::FeatureRow;
use crate::domain::record::{FieldValue, RawRecord};

/// Version of the encoding contract baked into every artifact
pub const ENCODING_VERSION: u32 = 1;

/// Attribute names as they appear in CSV headers and JSON bodies
pub mod field {
    pub const PERSON_ID:               &str = "Person ID";
    pub const QUALITY_OF_SLEEP:        &str = "Quality of Sleep";
    pub const AGE:                     &str = "Age";
    pub const GENDER:                  &str = "Gender";
    pub const SLEEP_DURATION:          &str = "Sleep Duration";
    pub const OCCUPATION:              &str = "Occupation";
    pub const BMI_CATEGORY:            &str = "BMI Category";
    pub const SLEEP_DISORDER:          &str = "Sleep Disorder";
    pub const HEART_RATE:              &str = "Heart Rate";
    pub const STRESS_LEVEL:            &str = "Stress Level";
    pub const DAILY_STEPS:             &str = "Daily Steps";
    pub const PHYSICAL_ACTIVITY_LEVEL: &str = "Physical Activity Level";
    pub const BODY_TEMPERATURE:        &str = "Body Temperature";
    pub const BLOOD_PRESSURE:          &str = "Blood Pressure";
}

/// Every input field a prediction request must carry
pub const REQUIRED_FIELDS: [&str; 12] = [
    field::AGE,
    field::GENDER,
    field::SLEEP_DURATION,
    field::OCCUPATION,
    field::BMI_CATEGORY,
    field::SLEEP_DISORDER,
    field::HEART_RATE,
    field::STRESS_LEVEL,
    field::DAILY_STEPS,
    field::PHYSICAL_ACTIVITY_LEVEL,
    field::BODY_TEMPERATURE,
    field::BLOOD_PRESSURE,
];

/// Ordinal BMI ranks
pub const BMI_CATEGORIES: [(&str, u8); 4] = [
    ("Normal",        1),
    ("Normal Weight", 1),
    ("Overweight",    2),
    ("Obese",         3),
];

/// Sleep disorder labels
pub const SLEEP_DISORDERS: [(&str, u8); 3] = [
    ("None",        0),
    ("Sleep Apnea", 1),
    ("Insomnia",    2),
];

/// A batch row failed to encode. `row` is the zero-based position
/// in the slice handed to `encode_batch`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {source}")]
pub struct BatchEncodeError {
    pub row:    usize,
    #[source]
    pub source: EncodeError,
}

fn lookup(table: &[(&str, u8)], field: &'static str, value: &str) -> Result<u8, EncodeError> {
    table
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, code)| *code)
        .ok_or_else(|| EncodeError::UnknownCategory {
            field,
            value: value.to_string(),
        })
}

/// Map a BMI category to its ordinal rank
pub fn encode_bmi(value: &str) -> Result<u8, EncodeError> {
    lookup(&BMI_CATEGORIES, field::BMI_CATEGORY, value)
}

/// Map a sleep disorder to its label
pub fn encode_sleep_disorder(value: &str) -> Result<u8, EncodeError> {
    lookup(&SLEEP_DISORDERS, field::SLEEP_DISORDER, value)
}

/// Split "S/D" into (systolic, diastolic).
///
/// Exactly one slash, both halves unsigned integers (surrounding
/// whitespace allowed). "120", "a/b", "120/80/70" are all rejected.
pub fn split_blood_pressure(raw: &str) -> Result<(u32, u32), EncodeError> {
    let malformed = || EncodeError::MalformedBloodPressure(raw.to_string());

    let (systolic, diastolic) = raw.split_once('/').ok_or_else(malformed)?;
    // A third component is refused rather than ignored, and `u32`
    // refuses a sign, so the model only ever sees a plain S/D reading.
    if diastolic.contains('/') {
        return Err(malformed());
    }

    let systolic  = systolic.trim().parse::<u32>().map_err(|_| malformed())?;
    let diastolic = diastolic.trim().parse::<u32>().map_err(|_| malformed())?;
    Ok((systolic, diastolic))
}

fn number(record: &RawRecord, name: &'static str) -> Result<f64, EncodeError> {
    let value = match record.get(name) {
        None => return Err(EncodeError::MissingField(name)),
        Some(FieldValue::Number(n)) => *n,
        Some(FieldValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(EncodeError::MissingField(name));
            }
            trimmed.parse::<f64>().map_err(|_| EncodeError::NotNumeric {
                field: name,
                value: format!("'{s}'"),
            })?
        }
    };

    if !value.is_finite() {
        return Err(EncodeError::NotNumeric {
            field: name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn text<'a>(record: &'a RawRecord, name: &'static str) -> Result<&'a str, EncodeError> {
    match record.get(name) {
        None => Err(EncodeError::MissingField(name)),
        Some(FieldValue::Number(_)) => Err(EncodeError::NotText { field: name }),
        Some(FieldValue::Text(s)) if s.trim().is_empty() => Err(EncodeError::MissingField(name)),
        Some(FieldValue::Text(s)) => Ok(s.as_str()),
    }
}

/// Encode one raw record into the 13-column feature row.
///
/// Fields are checked in model column order, so the first problem
/// reported is the left-most one.
pub fn encode_record(record: &RawRecord) -> Result<FeatureRow, EncodeError> {
    let age                     = number(record, field::AGE)?;
    let gender                  = text(record, field::GENDER)?.to_string();
    let sleep_duration          = number(record, field::SLEEP_DURATION)?;
    let occupation              = text(record, field::OCCUPATION)?.to_string();
    let bmi_category            = encode_bmi(text(record, field::BMI_CATEGORY)?)?;
    let sleep_disorder          = encode_sleep_disorder(text(record, field::SLEEP_DISORDER)?)?;
    let heart_rate              = number(record, field::HEART_RATE)?;
    let stress_level            = number(record, field::STRESS_LEVEL)?;
    let daily_steps             = number(record, field::DAILY_STEPS)?;
    let physical_activity_level = number(record, field::PHYSICAL_ACTIVITY_LEVEL)?;
    let body_temperature        = number(record, field::BODY_TEMPERATURE)?;
    let (systolic_bp, diastolic_bp) =
        split_blood_pressure(text(record, field::BLOOD_PRESSURE)?)?;

    Ok(FeatureRow {
        age,
        gender,
        sleep_duration,
        occupation,
        bmi_category,
        sleep_disorder,
        heart_rate,
        stress_level,
        daily_steps,
        physical_activity_level,
        body_temperature,
        systolic_bp,
        diastolic_bp,
    })
}

/// Encode many records with exactly the single-row rules.
pub fn encode_batch(records: &[RawRecord]) -> Result<Vec<FeatureRow>, BatchEncodeError> {
    records
        .iter()
        .enumerate()
        .map(|(row, r)| encode_record(r).map_err(|source| BatchEncodeError { row, source }))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_record;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bmi_vocabulary() {
        assert_eq!(encode_bmi("Normal"), Ok(1));
        assert_eq!(encode_bmi("Normal Weight"), Ok(1));
        assert_eq!(encode_bmi("Overweight"), Ok(2));
        assert_eq!(encode_bmi("Obese"), Ok(3));
        // Idempotent: mapping the same value twice gives the same rank
        assert_eq!(encode_bmi("Normal"), encode_bmi("Normal"));
    }

    #[test]
    fn test_bmi_rejects_unknown_and_case_variants() {
        for bad in ["Underweight", "normal", "Obese ", ""] {
            assert!(
                matches!(encode_bmi(bad), Err(EncodeError::UnknownCategory { field: "BMI Category", .. })),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_sleep_disorder_vocabulary() {
        assert_eq!(encode_sleep_disorder("None"), Ok(0));
        assert_eq!(encode_sleep_disorder("Sleep Apnea"), Ok(1));
        assert_eq!(encode_sleep_disorder("Insomnia"), Ok(2));
        assert!(matches!(
            encode_sleep_disorder("Narcolepsy"),
            Err(EncodeError::UnknownCategory { field: "Sleep Disorder", .. })
        ));
    }

    #[test]
    fn test_blood_pressure_split_is_inverse_of_format() {
        for (s, d) in [(0u32, 0u32), (120, 80), (130, 85), (142, 92), (999, 1)] {
            let raw = format!("{s}/{d}");
            assert_eq!(split_blood_pressure(&raw), Ok((s, d)));
        }
    }

    #[test]
    fn test_blood_pressure_tolerates_whitespace() {
        assert_eq!(split_blood_pressure(" 125 / 80 "), Ok((125, 80)));
    }

    #[test]
    fn test_blood_pressure_rejects_malformed() {
        for bad in ["120", "a/b", "120/", "/80", "120/80/70", "-120/80", "12.5/80", ""] {
            assert_eq!(
                split_blood_pressure(bad),
                Err(EncodeError::MalformedBloodPressure(bad.to_string())),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_encode_record_full_example() {
        let row = encode_record(&sample_record()).unwrap();
        assert_eq!(row.age, 29.0);
        assert_eq!(row.gender, "Female");
        assert_eq!(row.occupation, "Nurse");
        assert_eq!(row.bmi_category, 2);
        assert_eq!(row.sleep_disorder, 2);
        assert_eq!(row.body_temperature, 98.4);
        assert_eq!((row.systolic_bp, row.diastolic_bp), (130, 85));
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut record = sample_record();
        record.remove(field::HEART_RATE);
        assert_eq!(encode_record(&record), Err(EncodeError::MissingField("Heart Rate")));
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let record = sample_record().with(field::GENDER, "   ");
        assert_eq!(encode_record(&record), Err(EncodeError::MissingField("Gender")));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let record = sample_record().with(field::AGE, "29").with(field::DAILY_STEPS, " 4000 ");
        let row = encode_record(&record).unwrap();
        assert_eq!(row.age, 29.0);
        assert_eq!(row.daily_steps, 4000.0);
    }

    #[test]
    fn test_non_numeric_and_non_finite_are_rejected() {
        let record = sample_record().with(field::AGE, "old");
        assert!(matches!(encode_record(&record), Err(EncodeError::NotNumeric { field: "Age", .. })));

        let record = sample_record().with(field::STRESS_LEVEL, "NaN");
        assert!(matches!(
            encode_record(&record),
            Err(EncodeError::NotNumeric { field: "Stress Level", .. })
        ));
    }

    #[test]
    fn test_number_where_text_expected() {
        let record = sample_record().with(field::OCCUPATION, 3.0);
        assert_eq!(encode_record(&record), Err(EncodeError::NotText { field: "Occupation" }));
    }

    #[test]
    fn test_single_and_batch_encoding_agree() {
        let record = sample_record();
        let single = encode_record(&record).unwrap();
        let batch  = encode_batch(std::slice::from_ref(&record)).unwrap();
        assert_eq!(batch, vec![single]);
    }

    #[test]
    fn test_json_and_csv_style_records_agree() {
        // JSON path: numbers arrive as numbers
        let from_json = RawRecord::from_json(&json!({
            "Age": 29, "Gender": "Female", "Sleep Duration": 6.5, "Occupation": "Nurse",
            "BMI Category": "Overweight", "Sleep Disorder": "Insomnia", "Heart Rate": 75,
            "Stress Level": 7, "Daily Steps": 4000, "Physical Activity Level": 35,
            "Body Temperature": 98.4, "Blood Pressure": "130/85"
        }))
        .unwrap();

        // CSV path: every cell arrives as text
        let mut from_csv = RawRecord::new();
        for (name, cell) in [
            ("Age", "29"), ("Gender", "Female"), ("Sleep Duration", "6.5"),
            ("Occupation", "Nurse"), ("BMI Category", "Overweight"),
            ("Sleep Disorder", "Insomnia"), ("Heart Rate", "75"), ("Stress Level", "7"),
            ("Daily Steps", "4000"), ("Physical Activity Level", "35"),
            ("Body Temperature", "98.4"), ("Blood Pressure", "130/85"),
        ] {
            from_csv.insert(name, cell);
        }

        assert_eq!(encode_record(&from_json).unwrap(), encode_record(&from_csv).unwrap());
    }

    #[test]
    fn test_batch_error_reports_row() {
        let good = sample_record();
        let bad  = sample_record().with(field::BMI_CATEGORY, "Skinny");
        let err  = encode_batch(&[good.clone(), good, bad]).unwrap_err();
        assert_eq!(err.row, 2);
        assert!(matches!(err.source, EncodeError::UnknownCategory { .. }));
    }

    #[test]
    fn test_required_fields_cover_every_input() {
        let record = sample_record();
        for name in REQUIRED_FIELDS {
            let mut partial = record.clone();
            partial.remove(name);
            assert_eq!(encode_record(&partial), Err(EncodeError::MissingField(name)));
        }
    }
}
