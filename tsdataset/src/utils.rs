//! Conversions between table columns and numeric matrices

use crate::error::Result;
use ndarray::Array2;
use polars::prelude::*;

/// Get a column as f64 values; nulls become NaN
pub fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
    let col = df.column(column_name)?.cast(&DataType::Float64)?;
    Ok(col
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Stack `columns` of `df` into a `(rows, columns)` matrix
pub fn frame_to_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut matrix = Array2::<f64>::zeros((df.height(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        let values = column_as_f64(df, name)?;
        for (i, v) in values.into_iter().enumerate() {
            matrix[[i, j]] = v;
        }
    }
    Ok(matrix)
}

/// Split a `(rows, columns)` matrix back into named `Float64` series
pub fn matrix_to_series(matrix: &Array2<f64>, columns: &[String]) -> Vec<Series> {
    columns
        .iter()
        .enumerate()
        .map(|(j, name)| Series::new(name, matrix.column(j).to_vec()))
        .collect()
}
