//! Per-trial data creation from a shared dataset

use crate::config::TrialConfig;
use crate::error::Result;
use ndarray::Array3;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;
use tsdataset::{Scaler, TSDataset};

/// Rolled tensors of one trial
#[derive(Debug, Clone)]
pub struct TrialData {
    /// `(samples, lookback, channels)`
    pub x: Array3<f64>,
    /// `(samples, horizon_len, target channels)`, absent for a zero horizon
    pub y: Option<Array3<f64>>,
}

impl TrialData {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.x.shape()[0]
    }

    /// Check if the trial has no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the tensors of each trial from one read-only dataset.
///
/// The driver prepares (imputes, scales, ...) the dataset once and wraps it in
/// an `Arc`; every trial works on its own clone, so trials never observe each
/// other's rolling.
#[derive(Debug, Clone)]
pub struct DataCreator {
    data: Arc<TSDataset>,
    scaler: Option<Box<dyn Scaler>>,
}

impl DataCreator {
    pub fn new(data: Arc<TSDataset>) -> Self {
        Self { data, scaler: None }
    }

    /// Transform every trial copy with a fitted scaler before rolling.
    ///
    /// Used for validation data, with the scaler fitted on the training set.
    pub fn with_scaler(mut self, scaler: Box<dyn Scaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// The shared dataset
    pub fn dataset(&self) -> &TSDataset {
        &self.data
    }

    /// Roll a private copy of the dataset with the trial's window
    pub fn create(&self, config: &TrialConfig) -> Result<TrialData> {
        let mut trial = TSDataset::clone(&self.data);
        if let Some(scaler) = &self.scaler {
            trial.scale(scaler.clone(), false)?;
        }
        trial.roll(&config.roll_config())?;

        let (x, y) = trial.into_ndarray()?;
        debug!(
            lookback = config.lookback,
            samples = x.shape()[0],
            channels = x.shape()[2],
            "created trial data"
        );
        Ok(TrialData { x, y })
    }

    /// Create the data of many trials in parallel; results keep input order
    pub fn create_many(&self, configs: &[TrialConfig]) -> Vec<Result<TrialData>> {
        configs.par_iter().map(|config| self.create(config)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use tsdataset::Schema;

    fn shared() -> Arc<TSDataset> {
        let df = df!(
            "id" => &["a", "a", "a", "a", "a", "a"],
            "t" => &[0i64, 1, 2, 3, 4, 5],
            "value" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        )
        .unwrap();
        Arc::new(TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap())
    }

    #[test]
    fn test_trial_does_not_touch_shared_dataset() {
        let creator = DataCreator::new(shared());
        let data = creator.create(&TrialConfig::new(2, 1)).unwrap();
        assert_eq!(data.len(), 4);
        assert!(creator.dataset().to_ndarray().is_err());
    }

    #[test]
    fn test_failed_trial_is_reported() {
        let creator = DataCreator::new(shared());
        let bad = TrialConfig::new(2, 1).with_selected_features(&["missing"]);
        let results = creator.create_many(&[TrialConfig::new(3, 1), bad]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().len(), 3);
        assert!(results[1].is_err());
    }
}
