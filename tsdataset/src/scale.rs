//! Column-wise scalers and prediction unscaling

use crate::error::{DatasetError, Result};
use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A numeric column-wise transform that can be fit, applied and inverted.
///
/// Matrices are `(rows, columns)`. Implementations must treat every column
/// independently; prediction unscaling relies on it.
pub trait Scaler: Debug + Send + Sync {
    /// Fit on `data` and return it transformed
    fn fit_transform(&mut self, data: &Array2<f64>) -> Result<Array2<f64>>;

    /// Transform `data` with the fitted parameters
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>>;

    /// Undo [`Scaler::transform`]
    fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>>;

    /// Clone into a box, so a fitted scaler can be reused on another dataset
    fn clone_box(&self) -> Box<dyn Scaler>;
}

impl Clone for Box<dyn Scaler> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Scaler for Box<dyn Scaler> {
    fn fit_transform(&mut self, data: &Array2<f64>) -> Result<Array2<f64>> {
        (**self).fit_transform(data)
    }

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        (**self).transform(data)
    }

    fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        (**self).inverse_transform(data)
    }

    fn clone_box(&self) -> Box<dyn Scaler> {
        (**self).clone_box()
    }
}

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// Max absolute scaling: x / max(|x|)
    MaxAbs,
    /// Robust scaling using median and IQR
    Robust,
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,
    scale: f64,
}

/// Column-wise scaler of a given [`ScalerType`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnScaler {
    scaler_type: ScalerType,
    params: Option<Vec<ScalerParams>>,
}

impl ColumnScaler {
    /// Create an unfitted scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: None,
        }
    }

    pub fn standard() -> Self {
        Self::new(ScalerType::Standard)
    }

    pub fn min_max() -> Self {
        Self::new(ScalerType::MinMax)
    }

    pub fn max_abs() -> Self {
        Self::new(ScalerType::MaxAbs)
    }

    pub fn robust() -> Self {
        Self::new(ScalerType::Robust)
    }

    /// Kind of scaling
    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    /// Whether `fit_transform` has run
    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn fitted(&self, data: &Array2<f64>) -> Result<&[ScalerParams]> {
        let params = self.params.as_deref().ok_or_else(|| {
            DatasetError::StateError("scaler should be fitted before transform".to_string())
        })?;
        if params.len() != data.ncols() {
            return Err(DatasetError::ShapeError {
                expected: format!("{} columns", params.len()),
                actual: format!("{} columns", data.ncols()),
            });
        }
        Ok(params)
    }

    fn compute_params(&self, column: &[f64]) -> ScalerParams {
        let mut values: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return ScalerParams {
                center: 0.0,
                scale: 1.0,
            };
        }
        let n = values.len() as f64;

        let (center, spread) = match self.scaler_type {
            ScalerType::Standard => {
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                (mean, var.sqrt())
            }
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (min, max - min)
            }
            ScalerType::MaxAbs => {
                let max_abs = values.iter().fold(0.0f64, |a, b| a.max(b.abs()));
                (0.0, max_abs)
            }
            ScalerType::Robust => {
                values.sort_by(|a, b| a.total_cmp(b));
                let median = quantile(&values, 0.5);
                (median, quantile(&values, 0.75) - quantile(&values, 0.25))
            }
        };

        ScalerParams {
            center,
            scale: if spread == 0.0 { 1.0 } else { spread },
        }
    }
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl Scaler for ColumnScaler {
    fn fit_transform(&mut self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let params = data
            .axis_iter(Axis(1))
            .map(|col| self.compute_params(&col.to_vec()))
            .collect();
        self.params = Some(params);
        self.transform(data)
    }

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let params = self.fitted(data)?;
        let mut out = data.clone();
        for (mut col, p) in out.axis_iter_mut(Axis(1)).zip(params) {
            col.mapv_inplace(|v| (v - p.center) / p.scale);
        }
        Ok(out)
    }

    fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let params = self.fitted(data)?;
        let mut out = data.clone();
        for (mut col, p) in out.axis_iter_mut(Axis(1)).zip(params) {
            col.mapv_inplace(|v| v * p.scale + p.center);
        }
        Ok(out)
    }

    fn clone_box(&self) -> Box<dyn Scaler> {
        Box::new(self.clone())
    }
}

/// Invert the scaling of a 3-D prediction tensor.
///
/// Channel `k` of `pred` was scaled as column `scaler_index[k]` of a
/// `width`-column matrix. Each channel is inverted alone by placing it into an
/// otherwise-zero matrix of that width.
pub fn unscale_timeseries_ndarray(
    pred: &Array3<f64>,
    scaler: &dyn Scaler,
    scaler_index: &[usize],
    width: usize,
) -> Result<Array3<f64>> {
    let (samples, steps, channels) = pred.dim();
    if channels != scaler_index.len() {
        return Err(DatasetError::ShapeError {
            expected: format!("{} prediction channels", scaler_index.len()),
            actual: format!("{} channels", channels),
        });
    }
    if let Some(bad) = scaler_index.iter().find(|i| **i >= width) {
        return Err(DatasetError::ShapeError {
            expected: format!("scaler index below {}", width),
            actual: bad.to_string(),
        });
    }

    let rows = samples * steps;
    let mut out = Array3::<f64>::zeros((samples, steps, channels));
    for (k, &col) in scaler_index.iter().enumerate() {
        let mut full = Array2::<f64>::zeros((rows, width));
        for (r, v) in pred.index_axis(Axis(2), k).iter().enumerate() {
            full[[r, col]] = *v;
        }
        let restored = scaler.inverse_transform(&full)?;
        for (r, slot) in out.index_axis_mut(Axis(2), k).iter_mut().enumerate() {
            *slot = restored[[r, col]];
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn data() -> Array2<f64> {
        Array2::from_shape_vec(
            (5, 2),
            vec![1.0, -10.0, 2.0, 0.0, 3.0, 10.0, 4.0, 20.0, 5.0, 30.0],
        )
        .unwrap()
    }

    #[rstest]
    #[case(ScalerType::Standard)]
    #[case(ScalerType::MinMax)]
    #[case(ScalerType::MaxAbs)]
    #[case(ScalerType::Robust)]
    fn test_roundtrip(#[case] kind: ScalerType) {
        let mut scaler = ColumnScaler::new(kind);
        let scaled = scaler.fit_transform(&data()).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();
        for (a, b) in data().iter().zip(restored.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_standard_zero_mean() {
        let mut scaler = ColumnScaler::standard();
        let scaled = scaler.fit_transform(&data()).unwrap();
        let mean = scaled.column(0).sum() / 5.0;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_max_range() {
        let mut scaler = ColumnScaler::min_max();
        let scaled = scaler.fit_transform(&data()).unwrap();
        assert_abs_diff_eq!(scaled[[0, 1]], 0.0);
        assert_abs_diff_eq!(scaled[[4, 1]], 1.0);
    }

    #[test]
    fn test_constant_column_scale_is_one() {
        let flat = Array2::from_elem((3, 1), 7.0);
        let mut scaler = ColumnScaler::standard();
        let scaled = scaler.fit_transform(&flat).unwrap();
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_transform_before_fit() {
        let err = ColumnScaler::max_abs().transform(&data()).unwrap_err();
        assert!(matches!(err, DatasetError::StateError(_)));
    }

    #[test]
    fn test_unscale_tensor_by_index() {
        let mut scaler = ColumnScaler::min_max();
        scaler.fit_transform(&data()).unwrap();

        // two channels that are both column 1 of the fitted matrix
        let pred = Array3::from_shape_vec((1, 2, 2), vec![0.0, 1.0, 0.5, 0.25]).unwrap();
        let out = unscale_timeseries_ndarray(&pred, &scaler, &[1, 1], 2).unwrap();
        assert_abs_diff_eq!(out[[0, 0, 0]], -10.0);
        assert_abs_diff_eq!(out[[0, 0, 1]], 30.0);
        assert_abs_diff_eq!(out[[0, 1, 0]], 10.0);
        assert_abs_diff_eq!(out[[0, 1, 1]], 0.0);
    }

    #[test]
    fn test_unscale_tensor_channel_mismatch() {
        let mut scaler = ColumnScaler::standard();
        scaler.fit_transform(&data()).unwrap();
        let pred = Array3::<f64>::zeros((2, 1, 3));
        assert!(unscale_timeseries_ndarray(&pred, &scaler, &[0], 2).is_err());
    }
}
