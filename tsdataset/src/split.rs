//! Per-entity partitioning of a time series table
//!
//! Every per-entity operation goes through [`EntityPartitions`]: the table is
//! split into an ordered list of `(entity, sub-table)` pairs, each pair is
//! processed independently (possibly on the rayon pool), and the results are
//! joined back in entity order.

use crate::error::{DatasetError, Result};
use polars::prelude::*;
use rayon::prelude::*;

/// Distinct entity identifiers of `id_col`, sorted in the column's own dtype
/// and rendered as strings
pub fn entity_ids(df: &DataFrame, id_col: &str) -> Result<Vec<String>> {
    let unique = df.column(id_col)?.unique()?.sort(false);
    let keys = unique.cast(&DataType::Utf8)?;
    keys.utf8()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| DatasetError::SchemaError(format!("{} column should not have N/A", id_col)))
}

fn id_keys(df: &DataFrame, id_col: &str) -> Result<Series> {
    Ok(df.column(id_col)?.cast(&DataType::Utf8)?)
}

/// Ordered `(entity, sub-table)` pairs of one table
#[derive(Debug, Clone)]
pub struct EntityPartitions {
    parts: Vec<(String, DataFrame)>,
    /// Zero-row frame carrying the schema the parts are expected to share
    template: DataFrame,
}

impl EntityPartitions {
    /// Split `df` into one partition per identifier in `ids`, in that order.
    ///
    /// Identifiers without rows produce no partition.
    pub fn split(df: &DataFrame, id_col: &str, ids: &[String]) -> Result<Self> {
        let keys = id_keys(df, id_col)?;
        let keys = keys.utf8()?;

        let mut parts = Vec::with_capacity(ids.len());
        for id in ids {
            let mask = keys.equal(id.as_str());
            let part = df.filter(&mask)?;
            if part.height() > 0 {
                parts.push((id.clone(), part));
            }
        }

        Ok(Self {
            parts,
            template: df.slice(0, 0),
        })
    }

    /// Number of non-empty partitions
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether there are no partitions
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Entity identifiers in partition order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(id, _)| id.as_str())
    }

    /// Iterate over `(entity, sub-table)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataFrame)> {
        self.parts.iter().map(|(id, df)| (id.as_str(), df))
    }

    /// Replace every partition with `f(entity, partition)`.
    ///
    /// Partitions are processed in parallel; the output keeps entity order.
    /// Fails with the first error in entity order, leaving nothing half-done
    /// since `self` is consumed.
    pub fn try_map<F>(self, f: F) -> Result<Self>
    where
        F: Fn(&str, DataFrame) -> Result<DataFrame> + Send + Sync,
    {
        let template = f("", self.template)?;
        let parts = self
            .parts
            .into_par_iter()
            .map(|(id, df)| {
                let out = f(&id, df)?;
                Ok((id, out))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { parts, template })
    }

    /// Compute one value per partition, in entity order
    pub fn try_collect<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&str, &DataFrame) -> Result<T> + Send + Sync,
    {
        self.parts
            .par_iter()
            .map(|(id, df)| f(id, df))
            .collect::<Result<Vec<_>>>()
    }

    /// Concatenate the partitions back into one table, in entity order
    pub fn concat(self) -> Result<DataFrame> {
        let mut frames = self.parts.into_iter().map(|(_, df)| df);
        let Some(mut acc) = frames.next() else {
            return Ok(self.template);
        };
        for df in frames {
            acc.vstack_mut(&df)?;
        }
        Ok(acc)
    }
}
