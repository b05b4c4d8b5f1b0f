//! Timestamp access and sampling interval inference

use crate::error::{DatasetError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;

/// Days between 0001-01-01 (CE day 1) and the unix epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Spacing between consecutive rows of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingInterval {
    /// Calendar spacing of a datetime or date column
    Duration(Duration),
    /// Spacing of an integer time index
    Steps(i64),
}

/// Timestamps as integer ticks in the column's physical unit
pub fn ticks(series: &Series) -> Result<Vec<i64>> {
    let physical = series.cast(&DataType::Int64)?;
    physical
        .i64()?
        .into_iter()
        .collect::<Option<Vec<i64>>>()
        .ok_or_else(|| {
            DatasetError::SchemaError(format!("{} column should not have N/A", series.name()))
        })
}

/// Timestamps as naive UTC datetimes; only for datetime and date columns
pub fn datetimes(series: &Series) -> Result<Vec<NaiveDateTime>> {
    let raw = ticks(series)?;
    match series.dtype() {
        DataType::Datetime(unit, _) => raw
            .into_iter()
            .map(|v| from_unit(v, *unit))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| out_of_range(series.name())),
        DataType::Date => raw
            .into_iter()
            .map(|days| {
                i32::try_from(days)
                    .ok()
                    .and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE))
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| out_of_range(series.name())),
        other => Err(DatasetError::SchemaError(format!(
            "a datetime or date column is expected for {} but found {}",
            series.name(),
            other
        ))),
    }
}

fn from_unit(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let per_second: i64 = match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    };
    let secs = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(secs, nanos as u32).map(|dt| dt.naive_utc())
}

fn out_of_range(name: &str) -> DatasetError {
    DatasetError::SchemaError(format!("{} holds timestamps out of range", name))
}

/// Convert a tick delta of a column with `dtype` into an interval
pub fn tick_interval(dtype: &DataType, delta: i64) -> SamplingInterval {
    match dtype {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => {
            SamplingInterval::Duration(Duration::nanoseconds(delta))
        }
        DataType::Datetime(TimeUnit::Microseconds, _) => {
            SamplingInterval::Duration(Duration::microseconds(delta))
        }
        DataType::Datetime(TimeUnit::Milliseconds, _) => {
            SamplingInterval::Duration(Duration::milliseconds(delta))
        }
        DataType::Date => SamplingInterval::Duration(Duration::days(delta)),
        _ => SamplingInterval::Steps(delta),
    }
}

/// Result of inspecting the spacing of one entity's timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Spacing {
    /// Most frequent delta in ticks (the smallest one on ties)
    pub delta: i64,
    /// Whether every consecutive delta equals `delta`
    pub uniform: bool,
}

/// Inspect consecutive deltas; `None` for fewer than two rows
pub fn spacing(ticks: &[i64]) -> Option<Spacing> {
    if ticks.len() < 2 {
        return None;
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for pair in ticks.windows(2) {
        *counts.entry(pair[1] - pair[0]).or_insert(0) += 1;
    }

    let uniform = counts.len() == 1;
    let delta = counts
        .into_iter()
        .max_by(|(d1, c1), (d2, c2)| c1.cmp(c2).then(d2.cmp(d1)))
        .map(|(d, _)| d)?;

    Some(Spacing { delta, uniform })
}
