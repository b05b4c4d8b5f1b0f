//! Missing value imputation for one entity's sub-table

use crate::error::{DatasetError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Imputation strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ImputeMode {
    /// Propagate the last observed value forward, 0 where none precedes
    Last,
    /// Fill with a caller-supplied constant
    Const { value: f64 },
    /// Linear interpolation between observed neighbours
    Linear,
}

impl ImputeMode {
    /// Names accepted by [`ImputeMode::from_str`]
    pub const ALLOWED: [&'static str; 3] = ["last", "const", "linear"];

    /// Constant-fill strategy
    pub fn constant(value: f64) -> Self {
        ImputeMode::Const { value }
    }

    /// Resolve a strategy name; `const_num` is only used by `"const"`
    pub fn from_name(name: &str, const_num: f64) -> Result<Self> {
        match name {
            "last" => Ok(ImputeMode::Last),
            "const" => Ok(ImputeMode::Const { value: const_num }),
            "linear" => Ok(ImputeMode::Linear),
            other => Err(DatasetError::ConfigError(format!(
                "impute mode should be one of {:?} but found \"{}\"",
                Self::ALLOWED,
                other
            ))),
        }
    }

    /// Fill the gaps of one column
    pub fn fill(&self, values: &[Option<f64>]) -> Vec<f64> {
        match *self {
            ImputeMode::Last => fill_last(values),
            ImputeMode::Const { value } => values.iter().map(|v| v.unwrap_or(value)).collect(),
            ImputeMode::Linear => fill_linear(values),
        }
    }
}

impl FromStr for ImputeMode {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s, 0.0)
    }
}

impl fmt::Display for ImputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeMode::Last => write!(f, "last"),
            ImputeMode::Const { value } => write!(f, "const({})", value),
            ImputeMode::Linear => write!(f, "linear"),
        }
    }
}

fn fill_last(values: &[Option<f64>]) -> Vec<f64> {
    let mut last = 0.0;
    values
        .iter()
        .map(|v| {
            if let Some(x) = v {
                last = *x;
            }
            last
        })
        .collect()
}

fn fill_linear(values: &[Option<f64>]) -> Vec<f64> {
    let observed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|x| (i, x)))
        .collect();

    let (Some(&(first_idx, first)), Some(&(last_idx, last))) = (observed.first(), observed.last())
    else {
        return vec![0.0; values.len()];
    };

    let mut out = vec![0.0; values.len()];
    for slot in out.iter_mut().take(first_idx) {
        *slot = first;
    }
    for slot in out.iter_mut().skip(last_idx) {
        *slot = last;
    }
    for pair in observed.windows(2) {
        let (i0, v0) = pair[0];
        let (i1, v1) = pair[1];
        let span = (i1 - i0) as f64;
        for (k, slot) in out[i0..i1].iter_mut().enumerate() {
            *slot = v0 + (v1 - v0) * k as f64 / span;
        }
    }
    out
}

/// Column values with null and NaN both read as missing
pub fn optional_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Impute `columns` of one entity's sub-table; imputed columns become `Float64`
pub fn impute_frame(df: DataFrame, columns: &[String], mode: ImputeMode) -> Result<DataFrame> {
    let mut df = df;
    for name in columns {
        let values = optional_values(df.column(name)?)?;
        let filled = Series::new(name, mode.fill(&values));
        df.with_column(filled)?;
    }
    Ok(df)
}
