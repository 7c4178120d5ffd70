use crate::domain::features::FeatureRow;

/// Encoded training rows paired with their Quality of Sleep targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepDataset {
    rows:    Vec<FeatureRow>,
    targets: Vec<f64>,
}

/// One (row, target) pair, the unit the splitter shuffles
pub type Sample = (FeatureRow, f64);

impl SleepDataset {
    /// Panics if the two vectors differ in length; callers build
    /// both from the same record list.
    pub fn new(rows: Vec<FeatureRow>, targets: Vec<f64>) -> Self {
        assert_eq!(rows.len(), targets.len(), "rows and targets must align");
        Self { rows, targets }
    }

    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let (rows, targets) = samples.into_iter().unzip();
        Self { rows, targets }
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.rows.into_iter().zip(self.targets).collect()
    }

    pub fn rows(&self) -> &[FeatureRow] { &self.rows }

    pub fn targets(&self) -> &[f64] { &self.targets }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
