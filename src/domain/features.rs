// ============================================================
// Layer 3 — Feature Row and Column Catalogue
// ============================================================
// The encoded form of a record: 13 columns in a fixed order.
//
//   #   column                    kind
//   0   Age                       numeric
//   1   Gender                    nominal (one-hot)
//   2   Sleep Duration            numeric
//   3   Occupation                nominal (one-hot)
//   4   BMI Category              numeric (ordinal rank 1..=3)
//   5   Sleep Disorder            numeric (label 0..=2)
//   6   Heart Rate                numeric
//   7   Stress Level              numeric
//   8   Daily Steps               numeric
//   9   Physical Activity Level   numeric
//  10   Body Temperature          numeric
//  11   Systolic_BP               numeric
//  12   Diastolic_BP              numeric
//
// The order is part of the persisted model contract: the fitted
// preprocessor stores these names and the artifact loader refuses
// a pipeline whose list differs from `FeatureColumn::ALL`.

use serde::{Deserialize, Serialize};

/// How the preprocessor treats a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Standardised to zero mean / unit variance
    Numeric,
    /// One-hot expanded over the categories seen at fit time
    Nominal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureColumn {
    Age,
    Gender,
    SleepDuration,
    Occupation,
    BmiCategory,
    SleepDisorder,
    HeartRate,
    StressLevel,
    DailySteps,
    PhysicalActivityLevel,
    BodyTemperature,
    SystolicBp,
    DiastolicBp,
}

impl FeatureColumn {
    /// All feature columns in model order
    pub const ALL: [FeatureColumn; 13] = [
        FeatureColumn::Age,
        FeatureColumn::Gender,
        FeatureColumn::SleepDuration,
        FeatureColumn::Occupation,
        FeatureColumn::BmiCategory,
        FeatureColumn::SleepDisorder,
        FeatureColumn::HeartRate,
        FeatureColumn::StressLevel,
        FeatureColumn::DailySteps,
        FeatureColumn::PhysicalActivityLevel,
        FeatureColumn::BodyTemperature,
        FeatureColumn::SystolicBp,
        FeatureColumn::DiastolicBp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Age                   => "Age",
            FeatureColumn::Gender                => "Gender",
            FeatureColumn::SleepDuration         => "Sleep Duration",
            FeatureColumn::Occupation            => "Occupation",
            FeatureColumn::BmiCategory           => "BMI Category",
            FeatureColumn::SleepDisorder         => "Sleep Disorder",
            FeatureColumn::HeartRate             => "Heart Rate",
            FeatureColumn::StressLevel           => "Stress Level",
            FeatureColumn::DailySteps            => "Daily Steps",
            FeatureColumn::PhysicalActivityLevel => "Physical Activity Level",
            FeatureColumn::BodyTemperature       => "Body Temperature",
            FeatureColumn::SystolicBp            => "Systolic_BP",
            FeatureColumn::DiastolicBp           => "Diastolic_BP",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            FeatureColumn::Gender | FeatureColumn::Occupation => ColumnKind::Nominal,
            _ => ColumnKind::Numeric,
        }
    }

    /// Column names in model order, as stored inside the artifact
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn numeric() -> impl Iterator<Item = FeatureColumn> {
        Self::ALL.into_iter().filter(|c| c.kind() == ColumnKind::Numeric)
    }

    pub fn nominal() -> impl Iterator<Item = FeatureColumn> {
        Self::ALL.into_iter().filter(|c| c.kind() == ColumnKind::Nominal)
    }
}

/// One cell of a feature row, borrowed from the row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Numeric(f64),
    Category(&'a str),
}

/// A fully encoded record, ready for the preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub age:                     f64,
    pub gender:                  String,
    pub sleep_duration:          f64,
    pub occupation:              String,
    pub bmi_category:            u8,
    pub sleep_disorder:          u8,
    pub heart_rate:              f64,
    pub stress_level:            f64,
    pub daily_steps:             f64,
    pub physical_activity_level: f64,
    pub body_temperature:        f64,
    pub systolic_bp:             u32,
    pub diastolic_bp:            u32,
}

impl FeatureRow {
    pub fn cell(&self, column: FeatureColumn) -> Cell<'_> {
        match column {
            FeatureColumn::Age                   => Cell::Numeric(self.age),
            FeatureColumn::Gender                => Cell::Category(&self.gender),
            FeatureColumn::SleepDuration         => Cell::Numeric(self.sleep_duration),
            FeatureColumn::Occupation            => Cell::Category(&self.occupation),
            FeatureColumn::BmiCategory           => Cell::Numeric(f64::from(self.bmi_category)),
            FeatureColumn::SleepDisorder         => Cell::Numeric(f64::from(self.sleep_disorder)),
            FeatureColumn::HeartRate             => Cell::Numeric(self.heart_rate),
            FeatureColumn::StressLevel           => Cell::Numeric(self.stress_level),
            FeatureColumn::DailySteps            => Cell::Numeric(self.daily_steps),
            FeatureColumn::PhysicalActivityLevel => Cell::Numeric(self.physical_activity_level),
            FeatureColumn::BodyTemperature       => Cell::Numeric(self.body_temperature),
            FeatureColumn::SystolicBp            => Cell::Numeric(f64::from(self.systolic_bp)),
            FeatureColumn::DiastolicBp           => Cell::Numeric(f64::from(self.diastolic_bp)),
        }
    }

    /// Numeric value of a numeric column. Nominal columns yield NaN,
    /// which the preprocessor never asks for.
    pub fn numeric(&self, column: FeatureColumn) -> f64 {
        match self.cell(column) {
            Cell::Numeric(v) => v,
            Cell::Category(_) => f64::NAN,
        }
    }

    /// Category of a nominal column, `None` for numeric columns
    pub fn category(&self, column: FeatureColumn) -> Option<&str> {
        match self.cell(column) {
            Cell::Category(c) => Some(c),
            Cell::Numeric(_) => None,
        }
    }

    /// All cells in model column order
    #[cfg(test)]
    pub fn cells(&self) -> Vec<Cell<'_>> {
        FeatureColumn::ALL.iter().map(|&c| self.cell(c)).collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_is_fixed() {
        let names = FeatureColumn::names();
        assert_eq!(
            names,
            vec![
                "Age", "Gender", "Sleep Duration", "Occupation", "BMI Category",
                "Sleep Disorder", "Heart Rate", "Stress Level", "Daily Steps",
                "Physical Activity Level", "Body Temperature", "Systolic_BP",
                "Diastolic_BP",
            ]
        );
    }

    #[test]
    fn test_only_gender_and_occupation_are_nominal() {
        let nominal: Vec<_> = FeatureColumn::nominal().collect();
        assert_eq!(nominal, vec![FeatureColumn::Gender, FeatureColumn::Occupation]);
        assert_eq!(FeatureColumn::numeric().count(), 11);
    }

    #[test]
    fn test_cells_follow_column_order() {
        let row = FeatureRow {
            age: 29.0,
            gender: "Female".into(),
            sleep_duration: 6.5,
            occupation: "Nurse".into(),
            bmi_category: 2,
            sleep_disorder: 2,
            heart_rate: 75.0,
            stress_level: 7.0,
            daily_steps: 4000.0,
            physical_activity_level: 35.0,
            body_temperature: 98.4,
            systolic_bp: 130,
            diastolic_bp: 85,
        };
        let cells = row.cells();
        assert_eq!(cells.len(), 13);
        assert_eq!(cells[1], Cell::Category("Female"));
        assert_eq!(cells[4], Cell::Numeric(2.0));
        assert_eq!(cells[12], Cell::Numeric(85.0));
        assert_eq!(row.category(FeatureColumn::Occupation), Some("Nurse"));
        assert_eq!(row.category(FeatureColumn::Age), None);
    }
}
