//! Calendar features derived from the timestamp column

use crate::error::Result;
use crate::time;
use chrono::{Datelike, NaiveDateTime, Timelike};
use polars::prelude::*;

/// Integer calendar attributes, in generation order
pub const TIME_FEATURE: [&str; 7] = [
    "MINUTE",
    "DAY",
    "DAYOFYEAR",
    "HOUR",
    "WEEKDAY",
    "WEEKOFYEAR",
    "MONTH",
];

/// Boolean attributes derived from the hour of day
pub const ADDITIONAL_TIME_FEATURE_HOUR: [&str; 2] = ["IS_AWAKE", "IS_BUSY_HOURS"];

/// Boolean attributes derived from the day of week
pub const ADDITIONAL_TIME_FEATURE_WEEKDAY: [&str; 1] = ["IS_WEEKEND"];

/// Generated column names for `dt_col`, e.g. `HOUR(datetime)`
pub fn feature_names(dt_col: &str) -> Vec<String> {
    TIME_FEATURE
        .iter()
        .chain(ADDITIONAL_TIME_FEATURE_HOUR.iter())
        .chain(ADDITIONAL_TIME_FEATURE_WEEKDAY.iter())
        .map(|attr| format!("{}({})", attr, dt_col))
        .collect()
}

fn calendar_value(attr: &str, t: &NaiveDateTime) -> i64 {
    match attr {
        "MINUTE" => t.minute() as i64,
        "DAY" => t.day() as i64,
        "DAYOFYEAR" => t.ordinal() as i64,
        "HOUR" => t.hour() as i64,
        "WEEKDAY" => t.weekday().num_days_from_monday() as i64,
        "WEEKOFYEAR" => t.iso_week().week() as i64,
        _ => t.month() as i64,
    }
}

fn is_awake(t: &NaiveDateTime) -> bool {
    let hour = t.hour();
    (6..=23).contains(&hour) || hour == 0
}

fn is_busy_hours(t: &NaiveDateTime) -> bool {
    let hour = t.hour();
    (7..=9).contains(&hour) || (16..=19).contains(&hour)
}

fn is_weekend(t: &NaiveDateTime) -> bool {
    t.weekday().num_days_from_monday() >= 5
}

/// Append (or overwrite) the calendar feature columns of one sub-table
pub fn generate_dt_features(df: DataFrame, dt_col: &str) -> Result<DataFrame> {
    let stamps = time::datetimes(df.column(dt_col)?)?;
    let mut df = df;

    for attr in TIME_FEATURE {
        let values: Vec<i64> = stamps.iter().map(|t| calendar_value(attr, t)).collect();
        df.with_column(Series::new(&format!("{}({})", attr, dt_col), values))?;
    }

    let flags: [(&str, fn(&NaiveDateTime) -> bool); 3] = [
        (ADDITIONAL_TIME_FEATURE_HOUR[0], is_awake),
        (ADDITIONAL_TIME_FEATURE_HOUR[1], is_busy_hours),
        (ADDITIONAL_TIME_FEATURE_WEEKDAY[0], is_weekend),
    ];
    for (attr, flag) in flags {
        let values: Vec<bool> = stamps.iter().map(flag).collect();
        df.with_column(Series::new(&format!("{}({})", attr, dt_col), values))?;
    }

    Ok(df)
}
