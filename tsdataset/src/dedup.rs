//! Duplicate timestamp removal for one entity's sub-table

use crate::error::Result;
use crate::time;
use polars::prelude::*;
use std::collections::HashSet;

/// Keep the first row of every timestamp in `dt_col`
pub fn deduplicate_frame(df: DataFrame, dt_col: &str) -> Result<DataFrame> {
    let ticks = time::ticks(df.column(dt_col)?)?;
    let mut seen = HashSet::with_capacity(ticks.len());
    let keep: Vec<bool> = ticks.iter().map(|t| seen.insert(*t)).collect();

    if keep.iter().all(|k| *k) {
        return Ok(df);
    }

    let mask = BooleanChunked::from_slice("keep", &keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_occurrence() {
        let df = df!(
            "dt" => &[1i64, 2, 2, 3, 1],
            "value" => &[1.0, 2.0, 99.0, 3.0, 98.0]
        )
        .unwrap();
        let out = deduplicate_frame(df, "dt").unwrap();
        assert_eq!(out.height(), 3);
        let values: Vec<f64> = out
            .column("value")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_no_duplicates_is_untouched() {
        let df = df!("dt" => &[1i64, 2, 3]).unwrap();
        assert_eq!(deduplicate_frame(df, "dt").unwrap().height(), 3);
    }
}
