//! Shared fixtures for the unit tests
//!
//! Synthetic rows, a small fitted pipeline, CSV files in the
//! dataset's column layout, and ready / degraded routers.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::Router;

use crate::api::create_router;
use crate::application::predict_use_case::PredictorService;
use crate::domain::encoding::{encode_record, field};
use crate::domain::features::FeatureRow;
use crate::domain::record::RawRecord;
use crate::infra::artifact::{ArtifactMetadata, ArtifactStore};
use crate::ml::model::ForestConfig;
use crate::ml::pipeline::SleepPipeline;

/// The documented example request body
pub const SAMPLE_REQUEST: &str = r#"{
    "Age": 29, "Gender": "Female", "Sleep Duration": 6.5, "Occupation": "Nurse",
    "BMI Category": "Overweight", "Sleep Disorder": "Insomnia", "Heart Rate": 75,
    "Stress Level": 7, "Daily Steps": 4000, "Physical Activity Level": 35,
    "Body Temperature": 98.4, "Blood Pressure": "130/85"
}"#;

/// Column layout of the public dataset export (no Body Temperature)
pub const CSV_HEADER: &str = "Person ID,Gender,Age,Occupation,Sleep Duration,Quality of Sleep,\
Physical Activity Level,Stress Level,BMI Category,Blood Pressure,Heart Rate,Daily Steps,Sleep Disorder";

const GENDERS:     [&str; 2] = ["Male", "Female"];
const OCCUPATIONS: [&str; 4] = ["Nurse", "Doctor", "Engineer", "Teacher"];

/// The example request as a RawRecord
pub fn sample_record() -> RawRecord {
    RawRecord::new()
        .with(field::AGE, 29.0)
        .with(field::GENDER, "Female")
        .with(field::SLEEP_DURATION, 6.5)
        .with(field::OCCUPATION, "Nurse")
        .with(field::BMI_CATEGORY, "Overweight")
        .with(field::SLEEP_DISORDER, "Insomnia")
        .with(field::HEART_RATE, 75.0)
        .with(field::STRESS_LEVEL, 7.0)
        .with(field::DAILY_STEPS, 4000.0)
        .with(field::PHYSICAL_ACTIVITY_LEVEL, 35.0)
        .with(field::BODY_TEMPERATURE, 98.4)
        .with(field::BLOOD_PRESSURE, "130/85")
}

/// The example request, encoded
pub fn sample_row() -> FeatureRow {
    encode_record(&sample_record()).unwrap()
}

/// `n` deterministic rows with every numeric column varying and
/// two genders / four occupations represented (for n >= 4).
pub fn sample_rows(n: usize) -> Vec<FeatureRow> {
    (0..n)
        .map(|i| FeatureRow {
            age:                     25.0 + ((i * 7) % 30) as f64,
            gender:                  GENDERS[i % GENDERS.len()].to_string(),
            sleep_duration:          5.8 + ((i * 3) % 20) as f64 * 0.12,
            occupation:              OCCUPATIONS[i % OCCUPATIONS.len()].to_string(),
            bmi_category:            (i % 3) as u8 + 1,
            sleep_disorder:          (i % 3) as u8,
            heart_rate:              65.0 + ((i * 5) % 20) as f64,
            stress_level:            3.0 + ((i * 2) % 6) as f64,
            daily_steps:             3000.0 + ((i * 1337) % 7000) as f64,
            physical_activity_level: 30.0 + ((i * 11) % 60) as f64,
            body_temperature:        97.8 + (i % 5) as f64 * 0.2,
            systolic_bp:             115 + ((i * 3) % 25) as u32,
            diastolic_bp:            75 + ((i * 2) % 15) as u32,
        })
        .collect()
}

/// A smooth, bounded Quality of Sleep in [4, 9] for each row
pub fn synthetic_targets(rows: &[FeatureRow]) -> Vec<f64> {
    rows.iter()
        .map(|r| {
            let score = 10.0 - 0.5 * r.stress_level - 0.02 * (r.heart_rate - 65.0)
                + 0.6 * (r.sleep_duration - 6.0);
            score.clamp(4.0, 9.0)
        })
        .collect()
}

/// A small forest fitted on 40 synthetic rows
pub fn fitted_pipeline() -> SleepPipeline {
    let rows    = sample_rows(40);
    let targets = synthetic_targets(&rows);
    let config  = ForestConfig { n_trees: 10, ..ForestConfig::default() };
    SleepPipeline::fit(&rows, &targets, &config).unwrap()
}

pub fn ready_service() -> PredictorService {
    let pipeline = fitted_pipeline();
    let metadata = ArtifactMetadata::new(&pipeline, 40, 0, None);
    PredictorService::from_pipeline(pipeline, metadata)
}

/// Write `rows` under `CSV_HEADER` to `<dir>/dataset.csv`
pub fn write_csv(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("dataset.csv");
    let mut text = String::from(CSV_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(&path, text).unwrap();
    path
}

/// A valid training CSV of `n` rows built from `sample_rows`
pub fn training_csv(dir: &Path, n: usize) -> PathBuf {
    let rows    = sample_rows(n);
    let targets = synthetic_targets(&rows);

    let lines: Vec<String> = rows
        .iter()
        .zip(&targets)
        .enumerate()
        .map(|(i, (r, target))| {
            let bmi      = ["", "Normal", "Overweight", "Obese"][r.bmi_category as usize];
            let disorder = ["None", "Sleep Apnea", "Insomnia"][r.sleep_disorder as usize];
            format!(
                "{},{},{},{},{},{},{},{},{},{}/{},{},{},{}",
                i + 1,
                r.gender,
                r.age,
                r.occupation,
                r.sleep_duration,
                target.round(),
                r.physical_activity_level,
                r.stress_level,
                bmi,
                r.systolic_bp,
                r.diastolic_bp,
                r.heart_rate,
                r.daily_steps,
                disorder,
            )
        })
        .collect();

    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_csv(dir, &refs)
}

/// Router around a Ready predictor
pub fn create_test_app() -> Router {
    create_router(Arc::new(ready_service()))
}

/// Router around a predictor whose artifact is corrupt
pub fn create_degraded_app() -> Router {
    let dir   = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("model.json"));
    fs::write(store.path(), r#"{"format":"sleep-quality-pipe"#).unwrap();

    let predictor = PredictorService::new(store).load();
    assert_eq!(predictor.status(), "degraded");
    create_router(Arc::new(predictor))
}
