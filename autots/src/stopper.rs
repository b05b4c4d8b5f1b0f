//! Trial stop criteria

use crate::error::{AutoTsError, Result};
use crate::metrics::{Metric, Mode};
use crate::report::TrialReport;
use serde_json::{Map, Value};

/// Keys accepted in the stop criteria
pub const STOP_KEYS: [&str; 2] = ["reward_metric", "training_iteration"];

/// Search budget key passed alongside the stop criteria; not a stop condition
pub const NUM_SAMPLES_KEY: &str = "num_samples";

/// When a trial should stop.
///
/// A `reward_metric` of `r` becomes a threshold of `r` for maximised metrics
/// and `-r` for minimised ones.
#[derive(Debug, Clone, PartialEq)]
pub struct StopCriteria {
    pub metric: Metric,
    pub threshold: Option<f64>,
    pub training_iteration: u64,
}

impl StopCriteria {
    /// Stop after `training_iteration` iterations only
    pub fn iterations(metric: Metric, training_iteration: u64) -> Self {
        Self {
            metric,
            threshold: None,
            training_iteration,
        }
    }

    /// Build criteria from the runtime parameters of a search
    pub fn from_params(metric: Metric, params: &Map<String, Value>) -> Result<Self> {
        let unexpected: Vec<&String> = params
            .keys()
            .filter(|k| k.as_str() != NUM_SAMPLES_KEY && !STOP_KEYS.contains(&k.as_str()))
            .collect();
        if !unexpected.is_empty() {
            return Err(AutoTsError::ConfigError(format!(
                "{:?} is not expected in stop criteria, only {:?} are expected",
                unexpected, STOP_KEYS
            )));
        }

        let threshold = match params.get("reward_metric") {
            Some(value) => {
                let reward = value.as_f64().ok_or_else(|| {
                    AutoTsError::ConfigError(format!(
                        "reward_metric should be a number but found {}",
                        value
                    ))
                })?;
                Some(match metric.mode() {
                    Mode::Min => -reward,
                    Mode::Max => reward,
                })
            }
            None => None,
        };

        let training_iteration = match params.get("training_iteration") {
            Some(value) => value.as_u64().ok_or_else(|| {
                AutoTsError::ConfigError(format!(
                    "training_iteration should be a non-negative integer but found {}",
                    value
                ))
            })?,
            None => 1,
        };

        Ok(Self {
            metric,
            threshold,
            training_iteration,
        })
    }
}

/// Decides after every report whether the trial is done
#[derive(Debug, Clone)]
pub struct TrialStopper {
    criteria: StopCriteria,
}

impl TrialStopper {
    pub fn new(criteria: StopCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &StopCriteria {
        &self.criteria
    }

    /// Whether the trial that produced `report` should stop
    pub fn should_stop(&self, report: &TrialReport) -> bool {
        if let (Some(threshold), Some(value)) = (
            self.criteria.threshold,
            report.metric(self.criteria.metric.name()),
        ) {
            let reached = match self.criteria.metric.mode() {
                Mode::Max => value >= threshold,
                Mode::Min => value <= threshold,
            };
            if reached {
                return true;
            }
        }
        report.training_iteration >= self.criteria.training_iteration
    }

    /// Whether the whole search should stop; trials are only stopped one by one
    pub fn stop_all(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults_to_one_iteration() {
        let criteria = StopCriteria::from_params(Metric::Mse, &params(json!({"num_samples": 4})))
            .unwrap();
        assert_eq!(criteria, StopCriteria::iterations(Metric::Mse, 1));
    }

    #[test]
    fn test_reward_metric_sign() {
        let p = params(json!({"reward_metric": 0.5, "training_iteration": 10}));
        let min = StopCriteria::from_params(Metric::Mae, &p).unwrap();
        assert_eq!(min.threshold, Some(-0.5));
        assert_eq!(min.training_iteration, 10);

        let max = StopCriteria::from_params(Metric::R2, &p).unwrap();
        assert_eq!(max.threshold, Some(0.5));
    }

    #[test]
    fn test_unexpected_key() {
        let err = StopCriteria::from_params(Metric::Mse, &params(json!({"epochs": 3})))
            .unwrap_err();
        assert!(matches!(err, AutoTsError::ConfigError(_)));
    }

    #[test]
    fn test_should_stop() {
        let stopper = TrialStopper::new(StopCriteria {
            metric: Metric::R2,
            threshold: Some(0.9),
            training_iteration: 5,
        });
        let report = |i, r2| TrialReport::new("t0", i).with_metric("r2", r2);

        assert!(!stopper.should_stop(&report(1, 0.5)));
        assert!(stopper.should_stop(&report(2, 0.95)));
        assert!(stopper.should_stop(&report(5, 0.1)));
        assert!(!stopper.stop_all());
    }
}
