//! Evaluation metrics for forecast tensors

use crate::error::{AutoTsError, Result};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction in which a metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Min,
    Max,
}

/// Metric used to score a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Mean Squared Error
    Mse,
    /// Mean Absolute Error
    Mae,
    /// Root Mean Squared Error
    Rmse,
    /// Coefficient of determination
    R2,
    /// Symmetric Mean Absolute Percentage Error
    Smape,
    /// Mean Absolute Percentage Error
    Mape,
}

impl Metric {
    /// Names accepted by [`Metric::from_str`]
    pub const ALLOWED: [&'static str; 6] = ["mse", "mae", "rmse", "r2", "smape", "mape"];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Mse => "mse",
            Metric::Mae => "mae",
            Metric::Rmse => "rmse",
            Metric::R2 => "r2",
            Metric::Smape => "smape",
            Metric::Mape => "mape",
        }
    }

    /// Optimisation direction; only `r2` is maximised
    pub fn mode(&self) -> Mode {
        match self {
            Metric::R2 => Mode::Max,
            _ => Mode::Min,
        }
    }

    /// Whether `candidate` improves on `current`
    pub fn is_better(&self, candidate: f64, current: f64) -> bool {
        match self.mode() {
            Mode::Max => candidate > current,
            Mode::Min => candidate < current,
        }
    }

    /// Score `y_pred` against `y_true` over every element of the tensors
    pub fn evaluate(&self, y_true: &Array3<f64>, y_pred: &Array3<f64>) -> Result<f64> {
        if y_true.shape() != y_pred.shape() {
            return Err(AutoTsError::MetricError(format!(
                "y_true and y_pred should have the same shape but found {:?} and {:?}",
                y_true.shape(),
                y_pred.shape()
            )));
        }
        if y_true.is_empty() {
            return Err(AutoTsError::MetricError(
                "cannot evaluate empty tensors".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let pairs = || y_true.iter().zip(y_pred.iter());

        let score = match self {
            Metric::Mse => pairs().map(|(a, f)| (a - f).powi(2)).sum::<f64>() / n,
            Metric::Mae => pairs().map(|(a, f)| (a - f).abs()).sum::<f64>() / n,
            Metric::Rmse => (pairs().map(|(a, f)| (a - f).powi(2)).sum::<f64>() / n).sqrt(),
            Metric::R2 => {
                let mean = y_true.sum() / n;
                let ss_res = pairs().map(|(a, f)| (a - f).powi(2)).sum::<f64>();
                let ss_tot = y_true.iter().map(|a| (a - mean).powi(2)).sum::<f64>();
                if ss_tot == 0.0 {
                    if ss_res == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    1.0 - ss_res / ss_tot
                }
            }
            // zero actuals are skipped but still counted
            Metric::Mape => {
                pairs()
                    .filter(|(a, _)| **a != 0.0)
                    .map(|(a, f)| (a - f).abs() / a.abs() * 100.0)
                    .sum::<f64>()
                    / n
            }
            Metric::Smape => {
                pairs()
                    .map(|(a, f)| {
                        let denom = a.abs() + f.abs();
                        if denom == 0.0 {
                            0.0
                        } else {
                            200.0 * (a - f).abs() / denom
                        }
                    })
                    .sum::<f64>()
                    / n
            }
        };

        Ok(score)
    }
}

impl FromStr for Metric {
    type Err = AutoTsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mse" => Ok(Metric::Mse),
            "mae" => Ok(Metric::Mae),
            "rmse" => Ok(Metric::Rmse),
            "r2" => Ok(Metric::R2),
            "smape" => Ok(Metric::Smape),
            "mape" => Ok(Metric::Mape),
            other => Err(AutoTsError::MetricError(format!(
                "metric should be one of {:?} but found \"{}\"",
                Self::ALLOWED,
                other
            ))),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn tensors() -> (Array3<f64>, Array3<f64>) {
        let y_true = Array3::from_shape_vec((2, 2, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y_pred = Array3::from_shape_vec((2, 2, 1), vec![1.0, 3.0, 2.0, 4.0]).unwrap();
        (y_true, y_pred)
    }

    #[rstest]
    #[case(Metric::Mse, 0.5)]
    #[case(Metric::Mae, 0.5)]
    #[case(Metric::Rmse, 0.5f64.sqrt())]
    #[case(Metric::R2, 0.6)]
    #[case(Metric::Mape, (50.0 + 100.0 / 3.0) / 4.0)]
    #[case(Metric::Smape, (40.0 + 40.0) / 4.0)]
    fn test_evaluate(#[case] metric: Metric, #[case] expected: f64) {
        let (y_true, y_pred) = tensors();
        assert_abs_diff_eq!(metric.evaluate(&y_true, &y_pred).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_prediction() {
        let (y_true, _) = tensors();
        assert_eq!(Metric::Mse.evaluate(&y_true, &y_true).unwrap(), 0.0);
        assert_eq!(Metric::R2.evaluate(&y_true, &y_true).unwrap(), 1.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let (y_true, _) = tensors();
        let y_pred = Array3::<f64>::zeros((2, 1, 2));
        assert!(matches!(
            Metric::Mae.evaluate(&y_true, &y_pred).unwrap_err(),
            AutoTsError::MetricError(_)
        ));
    }

    #[test]
    fn test_modes_and_parsing() {
        assert_eq!("R2".parse::<Metric>().unwrap().mode(), Mode::Max);
        assert_eq!("smape".parse::<Metric>().unwrap().mode(), Mode::Min);
        assert!("accuracy".parse::<Metric>().is_err());
        assert!(Metric::Mse.is_better(0.1, 0.2));
        assert!(Metric::R2.is_better(0.9, 0.2));
        assert_eq!(Metric::Rmse.to_string(), "rmse");
    }
}
