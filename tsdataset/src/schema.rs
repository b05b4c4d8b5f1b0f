//! Schema description and validation for time series tables

use crate::error::{DatasetError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Column roles of a time series table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Entity identifier column
    pub id_col: String,
    /// Timestamp column
    pub dt_col: String,
    /// Target columns, in order
    pub target_col: Vec<String>,
    /// Extra feature columns, in order
    #[serde(default)]
    pub feature_col: Vec<String>,
}

impl Schema {
    /// Create a schema from column names
    pub fn new(id_col: &str, dt_col: &str, target_col: &[&str], feature_col: &[&str]) -> Self {
        Self {
            id_col: id_col.to_string(),
            dt_col: dt_col.to_string(),
            target_col: target_col.iter().map(|c| c.to_string()).collect(),
            feature_col: feature_col.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Build a schema from a JSON object, type-checking every field.
    ///
    /// `target_col` and `feature_col` may each be a single string or a list of
    /// strings; a missing or null `feature_col` means no extra features.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            DatasetError::SchemaError(format!(
                "an object is expected for schema but found {}",
                json_type(value)
            ))
        })?;

        Ok(Self {
            id_col: expect_string(obj.get("id_col"), "id_col")?,
            dt_col: expect_string(obj.get("dt_col"), "dt_col")?,
            target_col: to_list_json(obj.get("target_col"), "target_col")?,
            feature_col: to_list_json(obj.get("feature_col"), "feature_col")?,
        })
    }

    /// Target columns followed by feature columns
    pub fn value_columns(&self) -> Vec<String> {
        self.target_col
            .iter()
            .chain(self.feature_col.iter())
            .cloned()
            .collect()
    }

    /// Check the basic invariants of `df` against this schema.
    ///
    /// Runs at construction and after every mutation of the table.
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        if self.target_col.is_empty() {
            return Err(DatasetError::SchemaError(
                "at least one target column is expected".to_string(),
            ));
        }

        check_col_within(df, &self.id_col)?;
        check_col_within(df, &self.dt_col)?;
        for name in &self.target_col {
            check_col_within(df, name)?;
        }
        for name in &self.feature_col {
            check_col_within(df, name)?;
        }

        let targets: HashSet<&String> = self.target_col.iter().collect();
        if let Some(both) = self.feature_col.iter().find(|c| targets.contains(c)) {
            return Err(DatasetError::SchemaError(format!(
                "{} is listed both as target and as feature column",
                both
            )));
        }

        let dt_type = df.column(&self.dt_col)?.dtype().clone();
        if !is_time_index(&dt_type) {
            return Err(DatasetError::SchemaError(format!(
                "a datetime, date or integer column is expected for dt_col but found {}",
                dt_type
            )));
        }

        for name in self.value_columns() {
            check_col_numeric(df, &name)?;
        }

        check_col_no_na(df, &self.dt_col)?;
        check_col_no_na(df, &self.id_col)?;

        Ok(())
    }
}

/// Normalize a single column name or a list of names into a list
pub fn to_list<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| n.as_ref().to_string()).collect()
}

/// Fail unless `col_name` is a column of `df`
pub fn check_col_within(df: &DataFrame, col_name: &str) -> Result<()> {
    if df.get_column_names().iter().any(|c| *c == col_name) {
        Ok(())
    } else {
        Err(DatasetError::SchemaError(format!(
            "{} is expected in dataframe while not found",
            col_name
        )))
    }
}

/// Fail unless `col_name` exists and holds numeric or boolean values
pub fn check_col_numeric(df: &DataFrame, col_name: &str) -> Result<()> {
    check_col_within(df, col_name)?;
    let dtype = df.column(col_name)?.dtype().clone();
    if dtype.is_numeric() || dtype == DataType::Boolean {
        Ok(())
    } else {
        Err(DatasetError::SchemaError(format!(
            "a numeric column is expected for {} but found {}",
            col_name, dtype
        )))
    }
}

/// Fail if `col_name` holds any missing value
pub fn check_col_no_na(df: &DataFrame, col_name: &str) -> Result<()> {
    check_col_within(df, col_name)?;
    let column = df.column(col_name)?;
    let mut missing = column.null_count();
    if let Ok(values) = column.f64() {
        missing += values.into_iter().flatten().filter(|v| v.is_nan()).count();
    }
    if missing > 0 {
        return Err(DatasetError::SchemaError(format!(
            "{} column should not have N/A",
            col_name
        )));
    }
    Ok(())
}

fn is_time_index(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _)
            | DataType::Date
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_string(value: Option<&Value>, name: &str) -> Result<String> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(DatasetError::SchemaError(format!(
            "a string is expected for {} but found {}",
            name,
            json_type(other)
        ))),
        None => Err(DatasetError::SchemaError(format!("{} is required", name))),
    }
}

fn to_list_json(value: Option<&Value>, name: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(DatasetError::SchemaError(format!(
                    "a string is expected for {}[{}] but found {}",
                    name,
                    i,
                    json_type(other)
                ))),
            })
            .collect(),
        Some(other) => Err(DatasetError::SchemaError(format!(
            "a string or a list of strings is expected for {} but found {}",
            name,
            json_type(other)
        ))),
    }
}
